//! Job monitoring: a shared snapshot store plus a cancellable poll loop.
//!
//! The engine owns job state, so the client is a pure read cache: every
//! successful poll replaces the whole list, a failed poll leaves the
//! previous snapshot untouched, and a stale response that lost the race to a
//! newer one is discarded by sequence number.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::BackendApi;
use crate::core::models::Job;
use crate::logging::LogThrottle;

/// How often a backend outage is re-logged by the poll loop.
const POLL_FAILURE_LOG_WINDOW: Duration = Duration::from_secs(30);

#[derive(Default)]
struct BoardState {
    jobs: Vec<Job>,
    last_seq: u64,
    last_success: Option<DateTime<Utc>>,
}

/// Thread-safe store holding the most recent successful job snapshot.
///
/// Shared between the poll loop and whichever view is rendering jobs.
#[derive(Clone, Default)]
pub struct JobBoard {
    inner: Arc<RwLock<BoardState>>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a poll result. Returns false when the
    /// result is stale (an older poll arriving after a newer one) and was
    /// discarded.
    ///
    /// Status regressions (a job moving backwards through its lifecycle)
    /// indicate an engine bug; they are logged but the snapshot is still
    /// applied, since the engine is the owner of job truth.
    pub async fn apply(&self, seq: u64, jobs: Vec<Job>) -> bool {
        let mut state = self.inner.write().await;
        if state.last_seq >= seq {
            debug!(
                seq,
                applied = state.last_seq,
                "discarding stale job poll result"
            );
            return false;
        }

        for job in &jobs {
            if let Some(previous) = state.jobs.iter().find(|j| j.id == job.id)
                && !previous.status.can_advance_to(job.status)
            {
                warn!(
                    job_id = %job.id,
                    from = previous.status.label(),
                    to = job.status.label(),
                    "job status regressed",
                );
            }
        }

        state.jobs = jobs;
        state.last_seq = seq;
        state.last_success = Some(Utc::now());
        true
    }

    /// Current snapshot, as of the most recent successful poll.
    pub async fn jobs(&self) -> Vec<Job> {
        self.inner.read().await.jobs.clone()
    }

    pub async fn get(&self, job_id: &str) -> Option<Job> {
        self.inner
            .read()
            .await
            .jobs
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
    }

    pub async fn last_success(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_success
    }
}

/// Polls the backend job list on a fixed cadence while a monitoring view is
/// active.
#[derive(Clone)]
pub struct JobMonitor {
    api: Arc<dyn BackendApi>,
    board: JobBoard,
    interval: Duration,
    seq: Arc<AtomicU64>,
    failure_log: Arc<LogThrottle>,
}

impl JobMonitor {
    pub fn new(api: Arc<dyn BackendApi>, interval: Duration) -> Self {
        Self {
            api,
            board: JobBoard::new(),
            interval,
            seq: Arc::new(AtomicU64::new(0)),
            failure_log: Arc::new(LogThrottle::new(POLL_FAILURE_LOG_WINDOW)),
        }
    }

    /// Handle to the shared snapshot store.
    pub fn board(&self) -> JobBoard {
        self.board.clone()
    }

    /// Fetch one snapshot and reconcile it into the board. A failed fetch is
    /// logged (throttled) and otherwise swallowed: the previous snapshot
    /// stays up and the next cycle self-heals. Returns whether the board
    /// changed.
    pub async fn poll_once(&self) -> bool {
        // Sequence allocated before the fetch so a slow response can be
        // recognized as stale if a later poll finished first.
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        match self.api.list_jobs().await {
            Ok(jobs) => {
                self.failure_log.reset();
                self.board.apply(seq, jobs).await
            }
            Err(err) => {
                if self.failure_log.should_log() {
                    warn!(error = %err, "job poll failed; keeping previous snapshot");
                }
                false
            }
        }
    }

    /// Start the recurring poll loop. The loop stops when the returned
    /// handle is cancelled or dropped, regardless of in-flight requests.
    pub fn spawn(&self) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let monitor = self.clone();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        monitor.poll_once().await;
                    }
                }
            }
            debug!("job monitor stopped");
        });

        MonitorHandle { cancel, task }
    }
}

/// Scoped subscription to the poll loop: created on view entry, cancelled on
/// view exit. Dropping the handle cancels the loop, so navigation away can
/// never leak a running poller.
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop and wait for the loop task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        let _ = (&mut self.task).await;
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
