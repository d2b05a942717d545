//! Optional SIMD-accelerated downscale before measuring focus.
//!
//! Scores computed on a downscaled image are not comparable with
//! full-resolution scores, so this is off unless asked for.

use crate::error::ScoreError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{GrayImage, ImageBuffer, Luma};
use std::path::Path;

/// Fast grayscale resizer using SIMD acceleration
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Shrink `gray` so its longest side is at most `max_side`, keeping
    /// the aspect ratio. Images already small enough are returned as-is.
    pub fn fit_within(
        &mut self,
        path: &Path,
        gray: GrayImage,
        max_side: u32,
    ) -> Result<GrayImage, ScoreError> {
        let (src_width, src_height) = gray.dimensions();
        let longest = src_width.max(src_height);

        if max_side == 0 || longest <= max_side {
            return Ok(gray);
        }

        let scale = max_side as f64 / longest as f64;
        let width = ((src_width as f64 * scale).round() as u32).max(1);
        let height = ((src_height as f64 * scale).round() as u32).max(1);

        let resize_error = |reason: String| ScoreError::DecodeError {
            path: path.to_path_buf(),
            reason,
        };

        let src_image = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| resize_error(format!("Failed to create source image: {}", e)))?;

        let mut dst_image = Image::new(width, height, PixelType::U8);

        // Box filter averages each source area
        let options = ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
            fast_image_resize::FilterType::Box,
        ));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| resize_error(format!("Resize failed: {}", e)))?;

        let result: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, dst_image.into_vec())
                .ok_or_else(|| resize_error("Failed to create result buffer".to_string()))?;

        Ok(result)
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}
