//! Frame-loop driver for demos.
//!
//! A [`Driver`] owns one [`Demo`], its [`DemoContext`] and a renderer. Host events
//! and frame ticks are applied strictly one after another:
//!
//! ```text
//! start():  NotStarted -> setup -> size output -> Running
//! tick():   clock -> asset completions -> panel events -> update -> tweens -> controls -> render
//! ```
//!
//! # Invariants
//! - `setup` runs exactly once, before the first frame.
//! - A resize is fully reconciled before the next render.
//! - Elapsed time is monotonic; the first frame sees `elapsed == 0`.
//! - Failed asset loads and render errors are logged and never stop the loop.

mod clock;
mod context;
mod demo;
mod driver;
mod timer;
mod tween;

pub use clock::{FrameClock, FrameTime, ManualTime, SystemTime, TimeSource, smooth_towards};
pub use context::DemoContext;
pub use demo::{Demo, DemoSettings, LoopMode, ViewportMode};
pub use driver::{Driver, DriverOptions, LoopState};
pub use timer::FrameTimer;
pub use tween::{Ease, Property, Repeat, Timeline, Tween, TweenHandle, TweenOptions};

/// Errors from demo setup and driver lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("scene error: {0}")]
    Scene(#[from] scenelab_scene::SceneError),
    #[error("debug panel error: {0}")]
    Panel(#[from] scenelab_tools::PanelError),
    #[error("driver not started")]
    NotStarted,
    #[error("driver already started")]
    AlreadyStarted,
    #[error("unknown demo: {0}")]
    UnknownDemo(String),
}
