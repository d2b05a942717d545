//! # Focus Scan
//!
//! Finds the sharp photos in a folder tree.
//!
//! Every file under the chosen folder is decoded to grayscale and given a
//! focus score, the variance of its Laplacian. Photos scoring at or above a
//! threshold are listed best first. Nothing on disk is ever modified.
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - Enumeration, scoring, scheduling and the scan controller
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::{ScanController, ScanObserver, ScanRequest, ScanState};
pub use error::{FocusScanError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Verbosity comes from `RUST_LOG`; does nothing if a subscriber is
/// already installed.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
