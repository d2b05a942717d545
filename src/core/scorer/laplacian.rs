//! Variance of the Laplacian as a focus measure.
//!
//! The Laplacian responds to edges. A sharp photo has crisp edges and a
//! wide spread of Laplacian values; a blurred one has soft edges and a
//! narrow spread. The variance of the response is therefore higher the
//! better the focus.

use image::GrayImage;

/// Mirror an out-of-range index back into `0..n` without repeating the
/// edge pixel (`-1 -> 1`, `n -> n - 2`).
fn reflect101(index: i64, n: u32) -> u32 {
    let n = n as i64;
    if n == 1 {
        return 0;
    }
    let mut i = index;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as u32
}

/// Population variance of the 3x3 Laplacian `[0 1 0; 1 -4 1; 0 1 0]`
/// over every pixel, with reflect-101 borders.
///
/// Typical values run from ~0 for flat or very blurred images into the
/// thousands for crisp ones. An empty image scores 0.0.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let px = |x: i64, y: i64| -> f64 {
        gray.get_pixel(reflect101(x, width), reflect101(y, height))[0] as f64
    };

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let laplacian =
                px(x, y - 1) + px(x, y + 1) + px(x - 1, y) + px(x + 1, y) - 4.0 * px(x, y);
            sum += laplacian;
            sum_sq += laplacian * laplacian;
        }
    }

    let n = (width as f64) * (height as f64);
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn uniform(value: u8, size: u32) -> GrayImage {
        ImageBuffer::from_fn(size, size, |_, _| Luma([value]))
    }

    fn checkerboard(size: u32) -> GrayImage {
        ImageBuffer::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    fn box_blur(image: &GrayImage) -> GrayImage {
        let (w, h) = image.dimensions();
        ImageBuffer::from_fn(w, h, |x, y| {
            let mut total = 0u32;
            let mut count = 0u32;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = x as i64 + dx;
                    let sy = y as i64 + dy;
                    if sx >= 0 && sy >= 0 && sx < w as i64 && sy < h as i64 {
                        total += image.get_pixel(sx as u32, sy as u32)[0] as u32;
                        count += 1;
                    }
                }
            }
            Luma([(total / count) as u8])
        })
    }

    #[test]
    fn reflect101_mirrors_without_repeating_edge() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(2, 5), 2);
        assert_eq!(reflect101(-1, 1), 0);
    }

    #[test]
    fn uniform_image_scores_zero() {
        assert_eq!(laplacian_variance(&uniform(128, 64)), 0.0);
    }

    #[test]
    fn checkerboard_scores_exact_maximum() {
        // Every pixel responds with +/-1020, so variance is 1020^2.
        let score = laplacian_variance(&checkerboard(16));
        assert!((score - 1_040_400.0).abs() < 1e-6, "got {}", score);
    }

    #[test]
    fn blurring_lowers_the_score() {
        let sharp = checkerboard(32);
        let blurred = box_blur(&sharp);

        assert!(laplacian_variance(&blurred) < laplacian_variance(&sharp));
    }

    #[test]
    fn tiny_images_do_not_panic() {
        assert_eq!(laplacian_variance(&uniform(10, 1)), 0.0);
        assert!(laplacian_variance(&checkerboard(2)) > 0.0);
        assert_eq!(laplacian_variance(&GrayImage::new(0, 0)), 0.0);
    }
}
