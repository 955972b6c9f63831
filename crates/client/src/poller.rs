//! Per-job polling.
//!
//! A poller waits one interval, reads the job, applies the snapshot to the
//! tracker and repeats until the job is terminal, a read fails, or the job
//! stops being tracked. At most one read is in flight per poller.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tfd_protocol::job_models::JobStatus;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::DashboardApi;
use crate::tracker::JobTracker;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Tracker shared between the supervisor and its pollers.
pub type SharedTracker = Arc<Mutex<JobTracker>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Terminal(JobStatus),
    /// The read failed; the job was marked failed with this message.
    Errored(String),
    /// The job was closed locally.
    Closed,
}

impl PollState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, PollState::Polling)
    }
}

/// Invoked once when a polled job reaches a terminal status, so views
/// derived from server state (deployment lists) can reload.
#[async_trait]
pub trait RefreshHook: Send + Sync {
    async fn refresh(&self);
}

pub struct NoRefresh;

#[async_trait]
impl RefreshHook for NoRefresh {
    async fn refresh(&self) {}
}

pub struct JobPoller {
    job_id: Uuid,
    api: Arc<dyn DashboardApi>,
    tracker: SharedTracker,
    interval: Duration,
    state: PollState,
}

impl JobPoller {
    pub fn new(job_id: Uuid, api: Arc<dyn DashboardApi>, tracker: SharedTracker) -> Self {
        Self {
            job_id,
            api,
            tracker,
            interval: POLL_INTERVAL,
            state: PollState::Polling,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// One read and its application. No-op once finished.
    pub async fn poll_once(&mut self) -> &PollState {
        if self.state.is_finished() {
            return &self.state;
        }
        if !self.tracker.lock().await.contains(self.job_id) {
            self.state = PollState::Closed;
            return &self.state;
        }

        let result = self.api.get_job(self.job_id).await;

        let mut tracker = self.tracker.lock().await;
        if !tracker.contains(self.job_id) {
            self.state = PollState::Closed;
            return &self.state;
        }
        self.state = match result {
            Ok(view) => {
                tracker.update_from_server(self.job_id, &view);
                if view.status.is_terminal() {
                    PollState::Terminal(view.status)
                } else {
                    PollState::Polling
                }
            }
            Err(e) => {
                let message = format!("Failed to fetch job: {e}");
                warn!(job_id = %self.job_id, error = %e, "job poll failed");
                tracker.mark_failed(self.job_id, &message);
                PollState::Errored(message)
            }
        };
        &self.state
    }

    /// Poll until finished. The hook fires only on a terminal status.
    pub async fn run(mut self, hook: Arc<dyn RefreshHook>) -> PollState {
        while !self.state.is_finished() {
            tokio::time::sleep(self.interval).await;
            self.poll_once().await;
        }
        debug!(job_id = %self.job_id, state = ?self.state, "polling stopped");
        if matches!(self.state, PollState::Terminal(_)) {
            hook.refresh().await;
        }
        self.state
    }
}
