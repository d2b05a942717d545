//! Bookkeeping for the session a controller currently owns.

use crate::core::scheduler::CancellationToken;
use crate::events::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the controller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanState {
    /// Nothing running, nothing to show
    #[default]
    Idle,
    Scanning,
    /// Results were delivered and not yet acknowledged
    Completed,
    /// The last session was cancelled
    Stopped,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanState::Idle => "idle",
            ScanState::Scanning => "scanning",
            ScanState::Completed => "completed",
            ScanState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// One run of the scanner from Start to its terminal event.
#[derive(Debug)]
pub struct ScanSession {
    id: SessionId,
    root: PathBuf,
    threshold: f64,
    workers: usize,
    token: CancellationToken,
    state: ScanState,
    /// Progress as last delivered to the consumer
    delivered: (usize, usize),
}

impl ScanSession {
    pub(crate) fn new(
        id: SessionId,
        root: PathBuf,
        threshold: f64,
        workers: usize,
        total: usize,
        token: CancellationToken,
    ) -> Self {
        Self {
            id,
            root,
            threshold,
            workers,
            token,
            state: ScanState::Scanning,
            delivered: (0, total),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    /// `(completed, total)` as seen by the consumer
    pub fn progress(&self) -> (usize, usize) {
        self.delivered
    }

    pub(crate) fn record_delivered(&mut self, completed: usize) {
        self.delivered.0 = self.delivered.0.max(completed);
    }

    /// Cancel the session if it is still running. Returns `true` if this
    /// call moved it to `Stopped`.
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.is_scanning() {
            return false;
        }
        self.token.cancel();
        self.state = ScanState::Stopped;
        true
    }

    pub(crate) fn finish(&mut self, state: ScanState) {
        self.state = state;
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}
