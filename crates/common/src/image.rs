use serde::{Deserialize, Serialize};

/// Decoded pixel storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PixelData {
    /// 8-bit RGBA, row-major, `width * height * 4` bytes.
    Rgba8(Vec<u8>),
    /// 32-bit float RGBA (HDR sources), `width * height * 4` floats.
    Rgba32F(Vec<f32>),
}

/// A decoded 2D image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: PixelData,
}

impl Image {
    /// Single opaque white texel, bound where a texture has not arrived yet.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            data: PixelData::Rgba8(vec![255, 255, 255, 255]),
        }
    }

    pub fn is_hdr(&self) -> bool {
        matches!(self.data, PixelData::Rgba32F(_))
    }

    /// Convert to 8-bit RGBA, clamping HDR values with a simple Reinhard curve.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match &self.data {
            PixelData::Rgba8(bytes) => bytes.clone(),
            PixelData::Rgba32F(floats) => floats
                .chunks_exact(4)
                .flat_map(|px| {
                    let tone = |v: f32| {
                        let mapped = v.max(0.0) / (1.0 + v.max(0.0));
                        (mapped * 255.0).round() as u8
                    };
                    [
                        tone(px[0]),
                        tone(px[1]),
                        tone(px[2]),
                        (px[3].clamp(0.0, 1.0) * 255.0) as u8,
                    ]
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_one_texel() {
        let img = Image::white();
        assert_eq!(img.to_rgba8(), vec![255, 255, 255, 255]);
        assert!(!img.is_hdr());
    }

    #[test]
    fn hdr_is_tone_mapped() {
        let img = Image {
            width: 1,
            height: 1,
            data: PixelData::Rgba32F(vec![1.0, 0.0, 3.0, 1.0]),
        };
        let px = img.to_rgba8();
        assert_eq!(px[0], 128);
        assert_eq!(px[1], 0);
        assert!(px[2] > px[0]);
        assert_eq!(px[3], 255);
    }
}
