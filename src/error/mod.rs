//! # Error Module
//!
//! User-facing error types for the focus scanner.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, values, what went wrong
//! - **Per-file failures are data** - a broken photo scores 0.0, it never
//!   aborts a scan. Only [`InputError`] reaches the caller of `start`.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum FocusScanError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Could not start worker pool: {0}")]
    WorkerPool(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Problems with what the user asked for. Reported synchronously by
/// `ScanController::start`; no session is created.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("No folder selected. Please select a folder first.")]
    FolderNotSet,

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Invalid threshold '{value}': please enter a valid non-negative number")]
    InvalidThreshold { value: String },

    #[error("Invalid CPU percentage {value}: must be greater than zero")]
    InvalidCpuPercent { value: i64 },

    #[error("No images found in {path}")]
    NoImagesFound { path: PathBuf },
}

/// Errors raised while decoding or measuring a single photo.
///
/// These never cross the scheduler boundary; the scorer turns them into a
/// 0.0 score and a log line.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Failed to decode camera raw file {path}: {reason}")]
    RawDecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scoring panicked while processing {path}")]
    Panicked { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FocusScanError>;
