//! Scan execution on a dedicated rayon pool.

use super::{CancellationToken, ProgressCounter};
use crate::core::aggregator::{RankedResultSet, ResultAggregator, ScanResult};
use crate::core::enumerator::ImagePath;
use crate::core::scorer::{FocusScorer, ScoreOutcome};
use crate::error::{FocusScanError, ScoreError};
use crate::events::{EventSender, ScanSummary, SessionId};
use crossbeam_channel::RecvTimeoutError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often the coordinating thread re-checks the token while waiting
/// on slow files.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// The work for one session
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub session: SessionId,
    /// Files in discovery order
    pub paths: Vec<ImagePath>,
    /// Minimum score for a file to be kept
    pub threshold: f64,
    /// Entries the enumerator could not read
    pub skipped: usize,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum SchedulerOutcome {
    Completed {
        results: RankedResultSet,
        summary: ScanSummary,
    },
    Stopped,
}

/// One finished task, sent from a worker to the coordinating thread
struct Completion {
    index: usize,
    path: ImagePath,
    outcome: ScoreOutcome,
}

/// Runs a scorer over every file of a job on a fixed-size worker pool.
///
/// The thread that calls [`run`](ScanScheduler::run) coordinates: it
/// receives completions in the order workers finish them, applies the
/// threshold, feeds the aggregator, and emits progress. Only that thread
/// touches the aggregator.
pub struct ScanScheduler {
    pool: rayon::ThreadPool,
    workers: usize,
    token: CancellationToken,
}

impl ScanScheduler {
    /// Build a pool for `tasks` files with a budget of `workers`, tied to
    /// `token`. The pool never has more threads than files.
    pub fn new(workers: usize, tasks: usize, token: CancellationToken) -> Result<Self, FocusScanError> {
        let workers = workers.max(1);
        let threads = workers.min(tasks).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("focus-worker-{idx}"))
            .build()
            .map_err(|e| FocusScanError::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            workers,
            token,
        })
    }

    /// Worker budget derived from the CPU percentage
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Threads actually running in the pool
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Score every file in `job`, blocking the calling thread until the job
    /// finishes or the token is cancelled.
    ///
    /// Emits one `Progress` per finished file, a `ScoreFailed` for each file
    /// that could not be decoded, and finally exactly one of `Completed` or
    /// `Stopped`. After cancellation nothing more is forwarded; queued files
    /// are skipped and files already being scored are left to finish on
    /// their own.
    pub fn run(
        self,
        job: ScanJob,
        progress: &ProgressCounter,
        scorer: Arc<dyn FocusScorer>,
        events: &EventSender,
    ) -> SchedulerOutcome {
        let start_time = Instant::now();
        let ScanJob {
            session,
            paths,
            threshold,
            skipped,
        } = job;
        let total = paths.len();
        let events = events.for_session(session);
        tracing::debug!(%session, workers = self.workers, threads = self.threads(), "Worker pool ready");

        let (tx, rx) = crossbeam_channel::unbounded::<Completion>();

        for (index, path) in paths.into_iter().enumerate() {
            let tx = tx.clone();
            let token = self.token.clone();
            let scorer = Arc::clone(&scorer);

            self.pool.spawn(move || {
                if token.is_cancelled() {
                    return;
                }

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| scorer.score(path.as_path())))
                    .unwrap_or_else(|_| {
                        let error = ScoreError::Panicked {
                            path: path.as_path().to_path_buf(),
                        };
                        tracing::warn!(error = %error, "Scorer panicked");
                        ScoreOutcome::failed(error.to_string())
                    });

                let _ = tx.send(Completion {
                    index,
                    path,
                    outcome,
                });
            });
        }
        drop(tx);

        let mut aggregator = ResultAggregator::with_capacity(total);
        let mut failed = 0usize;

        let stopped = loop {
            if self.token.is_cancelled() {
                break true;
            }

            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(completion) => {
                    if self.token.is_cancelled() {
                        break true;
                    }

                    let completed = progress.record();
                    let current_path = completion.path.as_path().to_path_buf();

                    if let Some(message) = completion.outcome.failure {
                        failed += 1;
                        events.score_failed(current_path.clone(), message);
                    }

                    if completion.outcome.score.value() >= threshold {
                        aggregator.push(
                            completion.index,
                            ScanResult {
                                path: completion.path,
                                score: completion.outcome.score,
                            },
                        );
                    }

                    events.progress(completed, total, current_path);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break false,
            }
        };

        // Dropping the pool does not wait for running tasks; queued ones
        // see the token and return without scoring.
        drop(self.pool);
        tracing::debug!(%session, "Worker pool released");

        if stopped {
            tracing::info!(%session, "Scan stopped");
            aggregator.discard();
            events.stopped();
            return SchedulerOutcome::Stopped;
        }

        let results = aggregator.finish();
        let summary = ScanSummary {
            total_files: total,
            in_focus: results.len(),
            failed,
            skipped,
            workers: self.workers,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        tracing::info!(
            %session,
            total,
            in_focus = summary.in_focus,
            failed,
            skipped,
            duration_ms = summary.duration_ms,
            "Scan completed"
        );

        events.completed(results.clone(), summary.clone());

        SchedulerOutcome::Completed { results, summary }
    }
}
