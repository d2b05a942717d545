//! Grayscale decoding for standard raster formats.
//!
//! Uses zune-jpeg for JPEG files (decoding straight to luma), falls back
//! to the image crate for everything else.

use super::file_bytes::PhotoBytes;
use crate::error::ScoreError;
use image::{GrayImage, ImageBuffer, Luma};
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Extensions decoded by [`StandardDecoder`]
pub const STANDARD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Decoder for JPEG, PNG, BMP, TIFF and WebP
pub struct StandardDecoder;

impl StandardDecoder {
    /// Whether `path` has one of the standard extensions
    pub fn handles_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| STANDARD_EXTENSIONS.contains(&e.as_str()))
    }

    /// Decode a file to 8-bit grayscale.
    pub fn decode_gray(path: &Path) -> Result<GrayImage, ScoreError> {
        let is_jpeg = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| e == "jpg" || e == "jpeg");

        let gray = if is_jpeg {
            Self::decode_jpeg(path).or_else(|_| Self::decode_fallback(path))?
        } else {
            Self::decode_fallback(path)?
        };

        if gray.width() == 0 || gray.height() == 0 {
            return Err(ScoreError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(gray)
    }

    /// Fast JPEG decoding using zune-jpeg, asking for luma output directly
    fn decode_jpeg(path: &Path) -> Result<GrayImage, ScoreError> {
        let bytes = PhotoBytes::open(path)?;

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::Luma);
        let mut decoder = JpegDecoder::new_with_options(&bytes[..], options);

        let pixels = decoder.decode().map_err(|e| ScoreError::DecodeError {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| ScoreError::DecodeError {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;

        match decoder.get_output_colorspace() {
            Some(ColorSpace::Luma) => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        ScoreError::DecodeError {
                            path: path.to_path_buf(),
                            reason: "Failed to create Luma buffer".to_string(),
                        }
                    })?;
                Ok(buffer)
            }
            // Decoder ignored the luma request; let the image crate convert.
            _ => Self::decode_fallback(path),
        }
    }

    /// The image crate handles every other standard format
    fn decode_fallback(path: &Path) -> Result<GrayImage, ScoreError> {
        image::open(path)
            .map(|image| image.to_luma8())
            .map_err(|e| ScoreError::DecodeError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn standard_extensions_are_case_insensitive() {
        assert!(StandardDecoder::handles_extension(Path::new("photo.jpg")));
        assert!(StandardDecoder::handles_extension(Path::new("photo.JPEG")));
        assert!(StandardDecoder::handles_extension(Path::new("scan.TIF")));
        assert!(StandardDecoder::handles_extension(Path::new("image.webp")));
    }

    #[test]
    fn raw_and_unknown_extensions_are_not_standard() {
        assert!(!StandardDecoder::handles_extension(Path::new("DSC_0001.NEF")));
        assert!(!StandardDecoder::handles_extension(Path::new("photo.gif")));
        assert!(!StandardDecoder::handles_extension(Path::new("no_extension")));
    }

    #[test]
    fn decodes_png_to_gray() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rgb.png");
        let image = RgbImage::from_fn(16, 8, |x, _| Rgb([(x * 16) as u8, 0, 0]));
        DynamicImage::ImageRgb8(image).save(&path).unwrap();

        let gray = StandardDecoder::decode_gray(&path).unwrap();

        assert_eq!(gray.dimensions(), (16, 8));
    }

    #[test]
    fn decodes_jpeg_to_gray() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        let image = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
        DynamicImage::ImageRgb8(image).save(&path).unwrap();

        let gray = StandardDecoder::decode_gray(&path).unwrap();

        assert_eq!(gray.dimensions(), (32, 24));
    }

    #[test]
    fn corrupt_jpeg_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.jpg");
        File::create(&path)
            .unwrap()
            .write_all(b"this is not a valid image file")
            .unwrap();

        let result = StandardDecoder::decode_gray(&path);

        assert!(matches!(result, Err(ScoreError::DecodeError { .. })));
    }
}
