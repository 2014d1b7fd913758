/// Pointer position normalized to `[-0.5, 0.5]` on both axes, origin at the center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
    /// Flip y so that up is positive.
    pub invert_y: bool,
}

impl Cursor {
    pub fn new(invert_y: bool) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            invert_y,
        }
    }

    /// Update from a pointer position in logical pixels inside a `width` x `height` view.
    pub fn update(&mut self, px: f32, py: f32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.x = px / width as f32 - 0.5;
        let y = py / height as f32 - 0.5;
        self.y = if self.invert_y { -y } else { y };
    }
}
