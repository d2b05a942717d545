//! Grayscale decoding for camera raw files.
//!
//! rawloader gives us the undemosaiced sensor data. For focus measurement
//! we don't need colour, so each 2x2 Bayer block is averaged into a single
//! gray pixel after black/white level normalisation. The result is half
//! the sensor resolution in each direction.

use crate::error::ScoreError;
use image::{GrayImage, Luma};
use rawloader::{RawImage, RawImageData};
use std::path::Path;

/// Decoder for NEF, CR2, ARW, DNG and the other formats rawloader knows
pub struct RawDecoder;

impl RawDecoder {
    /// Decode a raw file to 8-bit grayscale.
    pub fn decode_gray(path: &Path) -> Result<GrayImage, ScoreError> {
        let raw = rawloader::decode_file(path).map_err(|e| ScoreError::RawDecodeError {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })?;

        sensor_to_gray(&raw).ok_or_else(|| ScoreError::EmptyImage {
            path: path.to_path_buf(),
        })
    }
}

/// Linear black/white normalisation into 0..=255
struct Levels {
    black: f32,
    range: f32,
}

impl Levels {
    fn from_raw(raw: &RawImage) -> Self {
        match raw.data {
            // Float DNGs are already scaled to 0..1
            RawImageData::Float(_) => Self {
                black: 0.0,
                range: 1.0,
            },
            RawImageData::Integer(_) => {
                let black = raw.blacklevels.iter().map(|&v| v as f32).sum::<f32>() / 4.0;
                let white = raw.whitelevels.iter().map(|&v| v as f32).sum::<f32>() / 4.0;
                Self {
                    black,
                    range: (white - black).max(1.0),
                }
            }
        }
    }

    fn to_u8(&self, value: f32) -> u8 {
        (((value - self.black) / self.range) * 255.0).clamp(0.0, 255.0) as u8
    }
}

fn sample(data: &RawImageData, index: usize) -> f32 {
    match data {
        RawImageData::Integer(values) => values[index] as f32,
        RawImageData::Float(values) => values[index],
    }
}

fn data_len(data: &RawImageData) -> usize {
    match data {
        RawImageData::Integer(values) => values.len(),
        RawImageData::Float(values) => values.len(),
    }
}

fn sensor_to_gray(raw: &RawImage) -> Option<GrayImage> {
    let (width, height, cpp) = (raw.width, raw.height, raw.cpp.max(1));
    if width == 0 || height == 0 || data_len(&raw.data) < width * height * cpp {
        return None;
    }

    let levels = Levels::from_raw(raw);

    if cpp == 1 {
        bin_bayer(raw, &levels)
    } else {
        let gray = GrayImage::from_fn(width as u32, height as u32, |x, y| {
            let base = (y as usize * width + x as usize) * cpp;
            let channels = cpp.min(3);
            let sum: f32 = (0..channels).map(|c| sample(&raw.data, base + c)).sum();
            Luma([levels.to_u8(sum / channels as f32)])
        });
        Some(gray)
    }
}

fn bin_bayer(raw: &RawImage, levels: &Levels) -> Option<GrayImage> {
    let width = raw.width;
    let (out_w, out_h) = (raw.width / 2, raw.height / 2);
    if out_w == 0 || out_h == 0 {
        return None;
    }

    let gray = GrayImage::from_fn(out_w as u32, out_h as u32, |x, y| {
        let (sx, sy) = (x as usize * 2, y as usize * 2);
        let top = sy * width + sx;
        let bottom = top + width;
        let sum = sample(&raw.data, top)
            + sample(&raw.data, top + 1)
            + sample(&raw.data, bottom)
            + sample(&raw.data, bottom + 1);
        Luma([levels.to_u8(sum / 4.0)])
    });

    Some(gray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn text_file_is_raw_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        File::create(&path)
            .unwrap()
            .write_all(b"shopping list: film, batteries")
            .unwrap();

        let result = RawDecoder::decode_gray(&path);

        assert!(matches!(result, Err(ScoreError::RawDecodeError { .. })));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(RawDecoder::decode_gray(Path::new("/nonexistent/DSC_0001.NEF")).is_err());
    }

    #[test]
    fn levels_map_black_to_zero_and_white_to_full() {
        let levels = Levels {
            black: 512.0,
            range: 16383.0 - 512.0,
        };
        assert_eq!(levels.to_u8(512.0), 0);
        assert_eq!(levels.to_u8(16383.0), 255);
        assert_eq!(levels.to_u8(0.0), 0);
        assert_eq!(levels.to_u8(20000.0), 255);
    }
}
