//! Event type definitions for scan progress reporting.

use crate::core::aggregator::RankedResultSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identifies one scan session of a `ScanController`.
///
/// Every event carries the id of the session that produced it so the
/// controller can drop events from superseded sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// All events emitted during a scan session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scoring has started; the total is fixed from here on
    Started {
        session: SessionId,
        root: PathBuf,
        total: usize,
        workers: usize,
        threshold: f64,
    },
    /// One more file finished scoring
    Progress(ScanProgress),
    /// A file could not be decoded and was scored 0.0 (diagnostic only)
    ScoreFailed {
        session: SessionId,
        path: PathBuf,
        message: String,
    },
    /// Every file was scored; results are ranked best first
    Completed {
        session: SessionId,
        results: RankedResultSet,
        summary: ScanSummary,
    },
    /// The session was cancelled; no results are delivered
    Stopped { session: SessionId },
}

impl ScanEvent {
    /// The session this event belongs to
    pub fn session(&self) -> SessionId {
        match self {
            ScanEvent::Started { session, .. }
            | ScanEvent::ScoreFailed { session, .. }
            | ScanEvent::Completed { session, .. }
            | ScanEvent::Stopped { session } => *session,
            ScanEvent::Progress(progress) => progress.session,
        }
    }

    /// Completed and Stopped end a session
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanEvent::Completed { .. } | ScanEvent::Stopped { .. })
    }
}

/// Progress information during scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub session: SessionId,
    /// Files scored so far (successes and failures)
    pub completed: usize,
    /// Files enumerated at session start
    pub total: usize,
    /// File that just finished
    pub current_path: PathBuf,
}

impl ScanProgress {
    /// Whole-number percentage, rounded down
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total).min(100) as u8
    }
}

/// Summary of a completed session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Files scored
    pub total_files: usize,
    /// Files that cleared the threshold
    pub in_focus: usize,
    /// Files that failed to decode (scored 0.0)
    pub failed: usize,
    /// Entries that could not be read during enumeration
    pub skipped: usize,
    /// Worker threads used
    pub workers: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = ScanEvent::Progress(ScanProgress {
            session: SessionId(3),
            completed: 10,
            total: 50,
            current_path: PathBuf::from("/photos/a.jpg"),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: ScanEvent = serde_json::from_str(&json).unwrap();

        match deserialized {
            ScanEvent::Progress(p) => {
                assert_eq!(p.completed, 10);
                assert_eq!(p.session, SessionId(3));
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn percent_rounds_down() {
        let progress = ScanProgress {
            session: SessionId(1),
            completed: 2,
            total: 3,
            current_path: PathBuf::new(),
        };
        assert_eq!(progress.percent(), 66);
    }

    #[test]
    fn only_completed_and_stopped_are_terminal() {
        assert!(ScanEvent::Stopped {
            session: SessionId(1)
        }
        .is_terminal());
        assert!(!ScanEvent::ScoreFailed {
            session: SessionId(1),
            path: PathBuf::from("x"),
            message: String::new(),
        }
        .is_terminal());
    }
}
