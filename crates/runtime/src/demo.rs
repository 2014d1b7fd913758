use crate::{DemoContext, FrameTime, RuntimeError};
use scenelab_assets::Completion;
use scenelab_input::HostEvent;
use scenelab_render::ResizePolicy;
use scenelab_tools::PanelEvent;

/// Where the viewport size comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportMode {
    /// Literal size; host resizes are ignored.
    Fixed { width: u32, height: u32 },
    /// Follow the host window.
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Render every host refresh.
    Continuous,
    /// Render a single frame after setup.
    Once,
}

/// Process-level shape of a demo.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSettings {
    pub title: String,
    pub viewport: ViewportMode,
    pub resize: ResizePolicy,
    pub loop_mode: LoopMode,
}

impl DemoSettings {
    /// Window-sized, resize-tracking, continuously rendered.
    pub fn window(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            viewport: ViewportMode::Window,
            resize: ResizePolicy::default(),
            loop_mode: LoopMode::Continuous,
        }
    }

    /// Fixed `width` x `height` at density 1, no resize handling.
    pub fn fixed(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            viewport: ViewportMode::Fixed { width, height },
            resize: ResizePolicy {
                track_host: false,
                cap_pixel_ratio: false,
            },
            loop_mode: LoopMode::Continuous,
        }
    }

    pub fn once(mut self) -> Self {
        self.loop_mode = LoopMode::Once;
        self
    }
}

/// A self-contained scene with a per-frame update.
///
/// `setup` builds the scene from literals; `update` derives transforms from the frame
/// time. Event hooks default to doing nothing.
pub trait Demo {
    fn name(&self) -> &'static str;

    fn settings(&self) -> DemoSettings {
        DemoSettings::window(self.name())
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError>;

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime);

    fn on_event(&mut self, _ctx: &mut DemoContext, _event: &HostEvent) {}

    fn on_panel_event(&mut self, _ctx: &mut DemoContext, _event: &PanelEvent) {}

    /// Completions not claimed by a pending texture (fonts, failures of direct requests).
    fn on_asset(&mut self, _ctx: &mut DemoContext, _completion: Completion) {}
}
