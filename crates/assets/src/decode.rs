use crate::AssetError;
use scenelab_common::{Image, PixelData};
use std::path::Path;

/// Face order of cube textures: +x, -x, +y, -y, +z, -z.
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

fn open(path: &Path) -> Result<image::DynamicImage, AssetError> {
    let reader = image::ImageReader::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = reader.with_guessed_format().map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    reader.decode().map_err(|e| AssetError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Decode a PNG/JPEG file into 8-bit RGBA.
pub fn decode_image(path: &Path) -> Result<Image, AssetError> {
    let rgba = open(path)?.to_rgba8();
    Ok(Image {
        width: rgba.width(),
        height: rgba.height(),
        data: PixelData::Rgba8(rgba.into_raw()),
    })
}

/// Decode a Radiance HDR file into float RGBA.
pub fn decode_hdr(path: &Path) -> Result<Image, AssetError> {
    let rgba = open(path)?.to_rgba32f();
    Ok(Image {
        width: rgba.width(),
        height: rgba.height(),
        data: PixelData::Rgba32F(rgba.into_raw()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let img = decode_image(&path).unwrap();
        assert_eq!((img.width, img.height), (2, 3));
        match img.data {
            PixelData::Rgba8(bytes) => assert_eq!(&bytes[..4], &[10, 20, 30, 255]),
            PixelData::Rgba32F(_) => panic!("expected 8-bit data"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = decode_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"not an image at all").unwrap();
        let err = decode_image(file.path()).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
