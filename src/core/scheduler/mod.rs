//! # Scheduler Module
//!
//! Fans scoring out over a bounded worker pool.
//!
//! ## Parallelism
//! The pool size comes from the user's CPU budget:
//! `max(1, floor(cores * percent / 125))`. Each session gets its own rayon
//! pool, so a stopped session's pool can wind down on its own while a new
//! one starts.
//!
//! ## Cancellation
//! A [`CancellationToken`] is shared by the session owner, the coordinating
//! thread and every queued task. Raising it is immediate and never waits on
//! in-flight work.

mod budget;
mod cancel;
mod executor;
mod progress;

pub use budget::{available_cores, worker_count, HEADROOM_DIVISOR};
pub use cancel::CancellationToken;
pub use executor::{ScanJob, ScanScheduler, SchedulerOutcome};
pub use progress::ProgressCounter;
