//! Shared types for the scenelab workspace.

mod color;
mod image;
mod types;

pub use color::{Color, ColorParseError};
pub use image::{Image, PixelData};
pub use types::{Euler, ObjectId, Transform};
