//! Completed/total counters for a session.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Running count of finished files against a total fixed at session start.
#[derive(Debug)]
pub struct ProgressCounter {
    completed: AtomicUsize,
    total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Count one more finished file and return the new completed count.
    /// Saturates at `total`.
    pub fn record(&self) -> usize {
        let previous = self
            .completed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some((n + 1).min(self.total))
            })
            .unwrap_or(self.total);
        (previous + 1).min(self.total)
    }

    /// `(completed, total)`
    pub fn snapshot(&self) -> (usize, usize) {
        (self.completed.load(Ordering::SeqCst), self.total)
    }
}
