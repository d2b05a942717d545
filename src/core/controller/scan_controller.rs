//! The session owner: validates requests, runs one scan at a time, and
//! hands the consumer a clean event stream.

use super::observer::{notify, ScanObserver};
use super::request::ScanRequest;
use super::session::{ScanSession, ScanState};
use crate::core::enumerator::{Enumerator, EnumeratorConfig, ImagePath};
use crate::core::scheduler::{
    available_cores, worker_count, CancellationToken, ProgressCounter, ScanJob, ScanScheduler,
};
use crate::core::scorer::{FocusScorer, LaplacianScorer, ScorerConfig};
use crate::error::{FocusScanError, InputError, Result};
use crate::events::{event_channel, EventReceiver, EventSender, Recv, ScanEvent, SessionId};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long a blocking read waits before re-checking the session state
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Controller-wide settings
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub enumerator: EnumeratorConfig,
    /// Core count to budget against; `None` asks the OS on every start
    pub cores: Option<usize>,
}

/// Builder for [`ScanController`]
#[derive(Default)]
pub struct ScanControllerBuilder {
    config: ControllerConfig,
    scorer_config: ScorerConfig,
    scorer: Option<Arc<dyn FocusScorer>>,
}

impl ScanControllerBuilder {
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn enumerator(mut self, config: EnumeratorConfig) -> Self {
        self.config.enumerator = config;
        self
    }

    /// Pretend the machine has `cores` cores
    pub fn cores(mut self, cores: usize) -> Self {
        self.config.cores = Some(cores);
        self
    }

    /// Settings for the built-in Laplacian scorer
    pub fn scorer_config(mut self, config: ScorerConfig) -> Self {
        self.scorer_config = config;
        self
    }

    /// Replace the built-in scorer
    pub fn scorer(mut self, scorer: Arc<dyn FocusScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn build(self) -> ScanController {
        let scorer: Arc<dyn FocusScorer> = match self.scorer {
            Some(scorer) => scorer,
            None => Arc::new(LaplacianScorer::new(self.scorer_config)),
        };
        let (sender, receiver) = event_channel();

        ScanController {
            enumerator: Enumerator::new(self.config.enumerator.clone()),
            config: self.config,
            scorer,
            sender,
            receiver,
            session: None,
            pending: VecDeque::new(),
            next_id: 1,
        }
    }
}

/// Owns at most one scan session and is the only consumer of its events.
///
/// Events are pulled with [`try_next_event`](Self::try_next_event),
/// [`next_event`](Self::next_event) or pushed into a [`ScanObserver`].
/// Events from superseded sessions, and anything a session produces after
/// it was stopped, are dropped here, so a consumer sees exactly one
/// terminal event per session and no progress once [`stop`](Self::stop)
/// has returned.
pub struct ScanController {
    config: ControllerConfig,
    enumerator: Enumerator,
    scorer: Arc<dyn FocusScorer>,
    sender: EventSender,
    receiver: EventReceiver,
    session: Option<ScanSession>,
    /// Events produced by the controller itself, delivered before the channel
    pending: VecDeque<ScanEvent>,
    next_id: u64,
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanController {
    /// Controller with the default enumerator and the Laplacian scorer
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ScanControllerBuilder {
        ScanControllerBuilder::default()
    }

    /// Start scanning `request.folder`.
    ///
    /// Everything that can fail is checked before any state changes: on
    /// error the current session, if any, keeps running untouched. A running
    /// session is cancelled and reported `Stopped` before the new one starts.
    pub fn start(&mut self, request: ScanRequest) -> Result<SessionId> {
        let folder = request.validate()?;

        let mut walk = self.enumerator.walk(folder)?;
        let root = walk.root().to_path_buf();
        let paths: Vec<ImagePath> = walk.by_ref().collect();
        let skipped = walk.skipped();

        if paths.is_empty() {
            tracing::info!(root = %root.display(), "No images found");
            return Err(InputError::NoImagesFound { path: root }.into());
        }

        self.supersede();

        let cores = self.config.cores.unwrap_or_else(available_cores);
        let workers = worker_count(cores, request.cpu_percent);
        tracing::debug!(cores, cpu_percent = request.cpu_percent, workers, "Derived worker count");

        let token = CancellationToken::new();
        let scheduler = ScanScheduler::new(workers, paths.len(), token.clone())?;

        let id = SessionId(self.next_id);
        self.next_id += 1;

        let total = paths.len();
        let job = ScanJob {
            session: id,
            paths,
            threshold: request.threshold,
            skipped,
        };
        let scorer = Arc::clone(&self.scorer);
        let sender = self.sender.clone();

        thread::Builder::new()
            .name(format!("focus-scan-{}", id.0))
            .spawn(move || {
                let progress = ProgressCounter::new(total);
                scheduler.run(job, &progress, scorer, &sender);
            })
            .map_err(|e| FocusScanError::WorkerPool(e.to_string()))?;

        tracing::info!(
            session = %id,
            root = %root.display(),
            total,
            skipped,
            workers,
            threshold = request.threshold,
            "Scan started"
        );

        self.pending.push_back(ScanEvent::Started {
            session: id,
            root: root.clone(),
            total,
            workers,
            threshold: request.threshold,
        });
        self.session = Some(ScanSession::new(
            id,
            root,
            request.threshold,
            workers,
            total,
            token,
        ));

        Ok(id)
    }

    /// Cancel the running session. Returns immediately; a no-op unless a
    /// scan is in progress. Returns `true` if a scan was stopped.
    pub fn stop(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if !session.cancel() {
            return false;
        }

        let id = session.id();
        tracing::info!(session = %id, "Stop requested");
        self.pending.push_back(ScanEvent::Stopped { session: id });
        true
    }

    /// Return to `Idle` after a `Completed` or `Stopped` session.
    /// Returns `false` while scanning or already idle.
    pub fn acknowledge(&mut self) -> bool {
        match self.session.as_ref().map(ScanSession::state) {
            Some(ScanState::Completed | ScanState::Stopped) => {
                self.session = None;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> ScanState {
        self.session
            .as_ref()
            .map(ScanSession::state)
            .unwrap_or(ScanState::Idle)
    }

    pub fn is_scanning(&self) -> bool {
        self.state() == ScanState::Scanning
    }

    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    /// `(completed, total)` of the current session as delivered so far
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.session.as_ref().map(ScanSession::progress)
    }

    /// Next event if one is ready, without blocking
    pub fn try_next_event(&mut self) -> Option<ScanEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        while let Some(event) = self.receiver.try_recv() {
            if let Some(event) = self.accept(event) {
                return Some(event);
            }
        }
        None
    }

    /// Wait up to `timeout` for the next event. Returns `None` on timeout
    /// or straight away when no scan is running and nothing is queued.
    pub fn next_event_timeout(&mut self, timeout: Duration) -> Option<ScanEvent> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if !self.is_scanning() {
                return None;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Recv::Event(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Recv::Timeout | Recv::Disconnected => return None,
            }
        }
    }

    /// Block until the next event. Returns `None` once no scan is running
    /// and nothing is queued.
    pub fn next_event(&mut self) -> Option<ScanEvent> {
        loop {
            if let Some(event) = self.next_event_timeout(IDLE_POLL) {
                return Some(event);
            }
            if self.pending.is_empty() && !self.is_scanning() {
                return None;
            }
        }
    }

    /// Deliver every ready event to `observer` without blocking. Returns
    /// how many were delivered.
    pub fn dispatch(&mut self, observer: &mut dyn ScanObserver) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.try_next_event() {
            notify(observer, &event);
            delivered += 1;
        }
        delivered
    }

    /// Deliver events to `observer` until the current session ends, then
    /// return the state it ended in.
    pub fn run_to_end(&mut self, observer: &mut dyn ScanObserver) -> ScanState {
        self.run_until(observer, &CancellationToken::new())
    }

    /// Like [`run_to_end`](Self::run_to_end), but stops the session once
    /// `interrupt` is raised from another thread (a Ctrl-C handler, say).
    /// The interrupt is checked at least every 100ms.
    pub fn run_until(
        &mut self,
        observer: &mut dyn ScanObserver,
        interrupt: &CancellationToken,
    ) -> ScanState {
        loop {
            if interrupt.is_cancelled() && self.stop() {
                tracing::info!("Scan interrupted");
            }

            match self.next_event_timeout(IDLE_POLL) {
                Some(event) => notify(observer, &event),
                None if self.pending.is_empty() && !self.is_scanning() => break,
                None => {}
            }
        }
        self.state()
    }

    /// Cancel and release the current session before a new one starts.
    fn supersede(&mut self) {
        if let Some(mut session) = self.session.take() {
            if session.cancel() {
                tracing::info!(session = %session.id(), "Superseding running scan");
                self.pending.push_back(ScanEvent::Stopped {
                    session: session.id(),
                });
            }
        }
    }

    /// Keep events of the running session; drop everything else.
    fn accept(&mut self, event: ScanEvent) -> Option<ScanEvent> {
        let session = self.session.as_mut()?;
        if event.session() != session.id() || !session.is_scanning() {
            tracing::trace!(session = %event.session(), "Dropping stale event");
            return None;
        }

        match &event {
            ScanEvent::Progress(progress) => session.record_delivered(progress.completed),
            ScanEvent::Completed { .. } => session.finish(ScanState::Completed),
            ScanEvent::Stopped { .. } => session.finish(ScanState::Stopped),
            ScanEvent::Started { .. } | ScanEvent::ScoreFailed { .. } => {}
        }
        Some(event)
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        if let Some(session) = self.session.as_ref() {
            session.token().cancel();
        }
    }
}
