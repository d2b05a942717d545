//! The channel between a running session and the `ScanController`.
//!
//! Unbounded: a session produces one progress event per file, and the
//! controller may not be polled while a UI is busy.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::time::Duration;

use super::{ScanEvent, ScanProgress, ScanSummary, SessionId};
use crate::core::aggregator::RankedResultSet;

/// Create a connected sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (inner, rx) = crossbeam_channel::unbounded();
    (EventSender { inner }, EventReceiver { inner: rx })
}

/// Cloneable sending half. Sends never block and never fail; once the
/// receiver is gone events are dropped.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<ScanEvent>,
}

impl EventSender {
    pub fn send(&self, event: ScanEvent) {
        let _ = self.inner.send(event);
    }

    /// A sender that stamps every event with `session`
    pub fn for_session(&self, session: SessionId) -> SessionEvents {
        SessionEvents {
            session,
            sender: self.clone(),
        }
    }
}

/// Typed emitters for the events of one session.
#[derive(Clone)]
pub struct SessionEvents {
    session: SessionId,
    sender: EventSender,
}

impl SessionEvents {
    pub fn progress(&self, completed: usize, total: usize, current_path: PathBuf) {
        self.sender.send(ScanEvent::Progress(ScanProgress {
            session: self.session,
            completed,
            total,
            current_path,
        }));
    }

    pub fn score_failed(&self, path: PathBuf, message: String) {
        self.sender.send(ScanEvent::ScoreFailed {
            session: self.session,
            path,
            message,
        });
    }

    pub fn completed(&self, results: RankedResultSet, summary: ScanSummary) {
        self.sender.send(ScanEvent::Completed {
            session: self.session,
            results,
            summary,
        });
    }

    pub fn stopped(&self) {
        self.sender.send(ScanEvent::Stopped {
            session: self.session,
        });
    }
}

/// Outcome of a timed receive
#[derive(Debug)]
pub enum Recv {
    Event(ScanEvent),
    Timeout,
    Disconnected,
}

/// Receiving half, owned by the single consumer.
pub struct EventReceiver {
    inner: Receiver<ScanEvent>,
}

impl EventReceiver {
    /// Next event if one is queued
    pub fn try_recv(&self) -> Option<ScanEvent> {
        self.inner.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Recv {
        match self.inner.recv_timeout(timeout) {
            Ok(event) => Recv::Event(event),
            Err(RecvTimeoutError::Timeout) => Recv::Timeout,
            Err(RecvTimeoutError::Disconnected) => Recv::Disconnected,
        }
    }

    /// Blocking iterator that ends once every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = ScanEvent> + '_ {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn session_events_carry_their_session() {
        let (sender, receiver) = event_channel();
        let events = sender.for_session(SessionId(4));

        events.progress(1, 3, PathBuf::from("/photos/a.jpg"));
        events.score_failed(PathBuf::from("/photos/b.nef"), "bad".to_string());
        events.stopped();
        drop(events);
        drop(sender);

        let received: Vec<_> = receiver.iter().collect();
        assert_eq!(received.len(), 3);
        assert!(received.iter().all(|e| e.session() == SessionId(4)));
        assert!(received[2].is_terminal());
    }

    #[test]
    fn sends_cross_threads() {
        let (sender, receiver) = event_channel();

        let handle = thread::spawn(move || {
            sender
                .for_session(SessionId(1))
                .progress(5, 25, PathBuf::from("/test.jpg"));
        });
        handle.join().unwrap();

        match receiver.try_recv() {
            Some(ScanEvent::Progress(p)) => {
                assert_eq!(p.completed, 5);
                assert_eq!(p.total, 25);
            }
            other => panic!("expected progress, got {other:?}"),
        }
    }

    #[test]
    fn send_after_receiver_dropped_is_ignored() {
        let (sender, receiver) = event_channel();
        drop(receiver);
        sender.for_session(SessionId(1)).stopped();
    }

    #[test]
    fn recv_timeout_reports_timeout_and_disconnect() {
        let (sender, receiver) = event_channel();
        assert!(matches!(
            receiver.recv_timeout(Duration::from_millis(5)),
            Recv::Timeout
        ));

        drop(sender);
        assert!(matches!(
            receiver.recv_timeout(Duration::from_millis(5)),
            Recv::Disconnected
        ));
    }

    #[test]
    fn try_recv_is_empty_when_nothing_sent() {
        let (_sender, receiver) = event_channel();
        assert!(receiver.try_recv().is_none());
    }
}
