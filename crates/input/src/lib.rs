//! Host input: window/pointer/keyboard events, the normalized cursor and orbit controls.
//!
//! # Invariants
//! - Demos consume [`HostEvent`]s, never raw windowing-system events.
//! - Orbit controls only move the camera inside [`OrbitControls::update`].

mod controls;
mod cursor;
mod event;

pub use controls::OrbitControls;
pub use cursor::Cursor;
pub use event::{HostEvent, Key};
