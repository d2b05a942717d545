//! # Scorer Module
//!
//! Turns a file path into a focus score.
//!
//! ## Contract
//! A scorer never fails past its boundary. Whatever goes wrong while
//! decoding or measuring a file (unsupported format, truncated data, a
//! panicking decoder) comes back as a score of exactly 0.0 plus a log line.
//! That makes a decode failure look the same as a perfectly flat image
//! downstream, which is what the threshold filter expects.
//!
//! ## Format dispatch
//! - **Standard** (`jpg jpeg png bmp tiff tif webp`) - zune-jpeg / image crate
//! - **Raw** (everything else) - rawloader, 2x2 binned sensor data
//!
//! Files with no extension at all are sniffed; a JPEG/PNG/GIF/BMP/WebP
//! header sends them to the standard decoder. Any other extension, `.gif`
//! included, goes to the raw decoder.
//!
//! ## Example
//! ```rust,ignore
//! use focus_scan::core::scorer::{FocusScorer, LaplacianScorer};
//!
//! let scorer = LaplacianScorer::default();
//! let outcome = scorer.score(Path::new("/photos/IMG_0001.jpg"));
//! println!("{:.1}", outcome.score);
//! ```

pub mod file_bytes;
mod laplacian;
mod raw;
mod resize;
mod standard;

pub use laplacian::laplacian_variance;
pub use raw::RawDecoder;
pub use resize::FastResizer;
pub use standard::{StandardDecoder, STANDARD_EXTENSIONS};

use crate::error::ScoreError;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Sharpness of one image. Never negative, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusScore(f64);

impl FocusScore {
    /// The score reported for files that could not be processed
    pub const FAILED: FocusScore = FocusScore(0.0);

    /// Wrap a raw measurement; NaN, infinite and negative values become 0.0
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self(0.0)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for FocusScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*}", precision, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// What the scheduler gets back for one file: the score, and whether it
/// came from a real measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub score: FocusScore,
    /// Why the file scored 0.0, if it failed
    pub failure: Option<String>,
}

impl ScoreOutcome {
    pub fn measured(value: f64) -> Self {
        Self {
            score: FocusScore::new(value),
            failure: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            score: FocusScore::FAILED,
            failure: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

/// Something that can measure the focus of an image file.
///
/// Implement [`try_score`](FocusScorer::try_score); the provided
/// [`score`](FocusScorer::score) applies the failure contract. Custom
/// implementations are handy in tests.
pub trait FocusScorer: Send + Sync {
    /// Measure the file, reporting failures as errors
    fn try_score(&self, path: &Path) -> Result<f64, ScoreError>;

    /// Measure the file, converting any failure into a 0.0 score
    fn score(&self, path: &Path) -> ScoreOutcome {
        match self.try_score(path) {
            Ok(value) => ScoreOutcome::measured(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error processing image");
                ScoreOutcome::failed(e.to_string())
            }
        }
    }
}

/// Which decoder a file is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecoderKind {
    Standard,
    Raw,
}

impl DecoderKind {
    /// Route by extension. Only files with no extension are sniffed, so an
    /// exported JPEG that lost its suffix still decodes.
    pub fn for_path(path: &Path) -> Self {
        if StandardDecoder::handles_extension(path) {
            return DecoderKind::Standard;
        }
        if path.extension().is_some() {
            return DecoderKind::Raw;
        }

        match file_bytes::read_header(path) {
            Some(header) if file_bytes::is_standard_header(&header) => DecoderKind::Standard,
            _ => DecoderKind::Raw,
        }
    }
}

/// Configuration for [`LaplacianScorer`]
#[derive(Debug, Clone, Default)]
pub struct ScorerConfig {
    /// Downscale so the longest side is at most this many pixels before
    /// measuring. `None` measures at full resolution.
    pub analysis_size: Option<u32>,
}

/// The production scorer: decode to grayscale, then Laplacian variance.
#[derive(Debug, Clone, Default)]
pub struct LaplacianScorer {
    config: ScorerConfig,
}

impl LaplacianScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Decode any supported file to grayscale
    pub fn decode_gray(&self, path: &Path) -> Result<GrayImage, ScoreError> {
        let gray = match DecoderKind::for_path(path) {
            DecoderKind::Standard => StandardDecoder::decode_gray(path)?,
            DecoderKind::Raw => RawDecoder::decode_gray(path)?,
        };

        match self.config.analysis_size {
            Some(max_side) => FastResizer::new().fit_within(path, gray, max_side),
            None => Ok(gray),
        }
    }
}

impl FocusScorer for LaplacianScorer {
    fn try_score(&self, path: &Path) -> Result<f64, ScoreError> {
        let gray = self.decode_gray(path)?;
        Ok(laplacian_variance(&gray))
    }
}
