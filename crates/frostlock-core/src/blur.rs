//! Screenshot blurring.

use std::path::Path;

use image::ImageFormat;

use crate::error::{Error, Result};

/// Decode the PNG at `path`, blur it and overwrite it with the result.
///
/// # Errors
///
/// Returns [`Error::ImageDecode`] or [`Error::ImageEncode`].
pub fn blur_in_place(path: &Path, sigma: f32) -> Result<()> {
    let source = image::open(path).map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;

    let blurred = image::imageops::fast_blur(&source.to_rgba8(), sigma);

    blurred
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| Error::ImageEncode {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_blur_softens_hard_edge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.png");
        let img = RgbaImage::from_fn(40, 8, |x, _| {
            if x < 20 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        img.save(&path).unwrap();

        blur_in_place(&path, 4.0).unwrap();

        let blurred = image::open(&path).unwrap().to_rgba8();
        assert_eq!(blurred.dimensions(), (40, 8));
        let left = blurred.get_pixel(19, 4)[0];
        let right = blurred.get_pixel(20, 4)[0];
        assert!(left > 0, "left of the edge picked up light");
        assert!(right < 255, "right of the edge picked up dark");
    }

    #[test]
    fn test_blur_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = blur_in_place(&dir.path().join("missing.png"), 2.0).unwrap_err();
        assert!(matches!(err, Error::ImageDecode { .. }));
    }

    #[test]
    fn test_blur_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = blur_in_place(&path, 2.0).unwrap_err();
        assert!(matches!(err, Error::ImageDecode { .. }));
    }
}
