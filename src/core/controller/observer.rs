//! Callback-style consumption of scan events.

use crate::core::aggregator::RankedResultSet;
use crate::events::{ScanEvent, ScanProgress, ScanSummary, SessionId};
use std::path::Path;

/// Receives the events of a scan as method calls.
///
/// Every method has an empty default, so a front end only implements what
/// it shows. Calls are made on the thread that drives
/// [`ScanController::dispatch`](super::ScanController::dispatch) or
/// [`ScanController::run_until`](super::ScanController::run_until).
pub trait ScanObserver {
    fn on_started(&mut self, _session: SessionId, _root: &Path, _total: usize, _workers: usize) {}

    fn on_progress(&mut self, _progress: &ScanProgress) {}

    /// A file could not be decoded and was given a 0.0 score
    fn on_score_failed(&mut self, _path: &Path, _message: &str) {}

    fn on_completed(&mut self, _results: &RankedResultSet, _summary: &ScanSummary) {}

    fn on_stopped(&mut self, _session: SessionId) {}
}

/// Route one event to the matching observer method.
pub(crate) fn notify(observer: &mut dyn ScanObserver, event: &ScanEvent) {
    match event {
        ScanEvent::Started {
            session,
            root,
            total,
            workers,
            ..
        } => observer.on_started(*session, root, *total, *workers),
        ScanEvent::Progress(progress) => observer.on_progress(progress),
        ScanEvent::ScoreFailed { path, message, .. } => observer.on_score_failed(path, message),
        ScanEvent::Completed {
            results, summary, ..
        } => observer.on_completed(results, summary),
        ScanEvent::Stopped { session } => observer.on_stopped(*session),
    }
}
