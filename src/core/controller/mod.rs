//! # Controller Module
//!
//! Session ownership and the scan state machine.
//!
//! ```text
//! Idle ──start──▶ Scanning ──all scored──▶ Completed ──acknowledge──▶ Idle
//!                    │  ▲
//!                  stop start (supersedes)
//!                    ▼  │
//!                  Stopped ──acknowledge──▶ Idle
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use focus_scan::core::controller::{ScanController, ScanRequest};
//!
//! let mut controller = ScanController::new();
//! controller.start(ScanRequest::new("/Users/me/Pictures").threshold(150.0))?;
//! while let Some(event) = controller.next_event() {
//!     println!("{:?}", event);
//! }
//! ```

mod observer;
mod request;
mod scan_controller;
mod session;

pub use observer::ScanObserver;
pub use request::{parse_threshold, ScanRequest, DEFAULT_CPU_PERCENT, DEFAULT_THRESHOLD};
pub use scan_controller::{ControllerConfig, ScanController, ScanControllerBuilder};
pub use session::{ScanSession, ScanState};
