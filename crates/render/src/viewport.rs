/// Upper bound applied to the device pixel ratio when the cap is enabled.
pub const MAX_PIXEL_DENSITY: f32 = 2.0;

/// Output dimensions in logical pixels plus the pixel density the sink renders at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_density: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_density: f32) -> Self {
        Self {
            width,
            height,
            pixel_density,
        }
    }

    /// Width over height; 1.0 for a degenerate (minimized) viewport.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Drawing buffer size in device pixels, never zero.
    pub fn physical_size(&self) -> (u32, u32) {
        physical_size(self.width, self.height, self.pixel_density)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600, 1.0)
    }
}

/// `min(device_pixel_ratio, 2)` when capped, the raw ratio otherwise.
pub fn pixel_density(device_pixel_ratio: f32, capped: bool) -> f32 {
    let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    if capped {
        ratio.min(MAX_PIXEL_DENSITY)
    } else {
        ratio
    }
}

pub(crate) fn physical_size(width: u32, height: u32, density: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * density).round() as u32).max(1);
    (scale(width), scale(height))
}
