//! # Core Module
//!
//! The GUI-agnostic focus scanning engine.
//!
//! ## Modules
//! - `enumerator` - Discovers candidate files under a folder
//! - `scorer` - Decodes photos and measures their sharpness
//! - `scheduler` - Runs the scorer on a bounded worker pool
//! - `aggregator` - Collects and ranks in-focus photos
//! - `controller` - Owns the scan session and its state machine

pub mod aggregator;
pub mod controller;
pub mod enumerator;
pub mod scheduler;
pub mod scorer;

// Re-export commonly used types
pub use aggregator::{RankedResultSet, ScanResult};
pub use controller::{ScanController, ScanObserver, ScanRequest, ScanState};
pub use enumerator::ImagePath;
pub use scorer::{FocusScore, FocusScorer, LaplacianScorer};
