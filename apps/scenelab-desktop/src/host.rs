//! winit input translated into [`HostEvent`]s.

use scenelab_input::{HostEvent, Key};
use scenelab_render::ResizeSignal;
use winit::dpi::PhysicalSize;
use winit::event::MouseScrollDelta;
use winit::keyboard::{Key as WinitKey, NamedKey};

/// Pixels scrolled per wheel notch.
const LINE_HEIGHT: f32 = 100.0;

pub fn key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(NamedKey::Escape) => Key::Escape,
        WinitKey::Named(NamedKey::Space) => Key::Space,
        WinitKey::Character(s) => s.chars().next().map_or(Key::Other, Key::Char),
        _ => Key::Other,
    }
}

/// Wheel movement in logical pixels; positive scrolls down the page.
pub fn wheel_delta(delta: MouseScrollDelta, scale_factor: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(p) => -(p.y / scale_factor) as f32,
    }
}

/// Logical size and pixel ratio of a window whose surface is `size` device pixels.
pub fn signal(size: PhysicalSize<u32>, scale_factor: f64) -> ResizeSignal {
    let logical = size.to_logical::<f64>(scale_factor);
    ResizeSignal {
        width: logical.width.round() as u32,
        height: logical.height.round() as u32,
        scale_factor: scale_factor as f32,
    }
}

pub fn resized(size: PhysicalSize<u32>, scale_factor: f64) -> HostEvent {
    let ResizeSignal {
        width,
        height,
        scale_factor,
    } = signal(size, scale_factor);
    HostEvent::Resized {
        width,
        height,
        scale_factor,
    }
}

/// Primary button state and last cursor position, for drag deltas.
#[derive(Debug, Default)]
pub struct Pointer {
    last: Option<(f32, f32)>,
    pressed: bool,
}

impl Pointer {
    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Events for a cursor move to logical `(x, y)`: always `CursorMoved`, plus a
    /// `Drag` while the primary button is held.
    pub fn moved(&mut self, x: f32, y: f32) -> Vec<HostEvent> {
        let mut events = vec![HostEvent::CursorMoved { x, y }];
        if let (true, Some((lx, ly))) = (self.pressed, self.last) {
            events.push(HostEvent::Drag {
                dx: x - lx,
                dy: y - ly,
            });
        }
        self.last = Some((x, y));
        events
    }
}
