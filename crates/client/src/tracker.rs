//! The client's tracked set of jobs.
//!
//! Every mutation rewrites the persisted snapshot: job summaries plus the
//! focused id, never the log text. Closing the last job removes the
//! snapshot entirely. Storage failures are logged and otherwise ignored.

use std::collections::HashMap;
use std::sync::Arc;
use tfd_protocol::job_models::{JobStatus, JobView};
use tfd_protocol::snapshot_models::{JobSummary, JobsSnapshot, JOBS_STORAGE_KEY};
use tracing::warn;
use uuid::Uuid;

use crate::storage::KeyValueStore;

/// Placeholder log for jobs rebuilt from a snapshot until their first read.
pub const RESTORING_LOG: &str = "Restoring job output...";

/// Shown in place of an empty log.
pub const WAITING_LOG: &str = "Waiting for output...";

/// Display metadata supplied when a job is registered.
#[derive(Debug, Clone, Default)]
pub struct JobMeta {
    pub title: String,
    pub subtitle: String,

    /// Shown until the first server read replaces it.
    pub initial_log: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedJob {
    pub id: Uuid,
    pub index: u64,
    pub title: String,
    pub subtitle: String,
    pub status: JobStatus,
    pub deployment_id: Option<String>,
    pub logs: Vec<String>,
}

impl TrackedJob {
    fn from_summary(summary: JobSummary, index: u64) -> Self {
        Self {
            id: summary.id,
            index,
            title: summary.title,
            subtitle: summary.subtitle,
            status: summary.status,
            deployment_id: summary.deployment_id,
            logs: vec![RESTORING_LOG.to_string()],
        }
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            index: self.index,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            status: self.status,
            deployment_id: self.deployment_id.clone(),
        }
    }

    /// `Status: <status>` with ` • Deployment: <id>` once one is known.
    pub fn status_line(&self) -> String {
        match &self.deployment_id {
            Some(deployment) => format!("Status: {} • Deployment: {deployment}", self.status),
            None => format!("Status: {}", self.status),
        }
    }

    pub fn log_text(&self) -> String {
        let text = self.logs.concat();
        if text.is_empty() {
            WAITING_LOG.to_string()
        } else {
            text
        }
    }
}

/// What an output panel shows for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDisplay {
    pub index: u64,
    pub title: String,
    /// Subtitle and status line joined with ` • `.
    pub subtitle: String,
    pub log_text: String,
    pub focused: bool,
}

/// Tracked jobs, display indices and focus.
///
/// The focused id, when set, always names a tracked job.
pub struct JobTracker {
    jobs: HashMap<Uuid, TrackedJob>,
    focused: Option<Uuid>,
    /// Highest index handed out so far.
    counter: u64,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for JobTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobTracker")
            .field("jobs", &self.jobs.len())
            .field("focused", &self.focused)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

impl JobTracker {
    /// An empty tracker. Does not touch storage.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            jobs: HashMap::new(),
            focused: None,
            counter: 0,
            store,
        }
    }

    /// Rebuild from the persisted snapshot.
    ///
    /// Indices are preserved; a summary without one gets the next free
    /// index in stored order. The counter ends at the highest index so new
    /// jobs never collide. Focus is the stored id when it was restored,
    /// otherwise the highest index. A missing or corrupt snapshot yields
    /// an empty tracker.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let mut tracker = Self::new(store);
        let Some(snapshot) = tracker.load_snapshot() else {
            return tracker;
        };

        let mut summaries = snapshot.jobs;
        summaries.sort_by_key(|summary| summary.index);
        for summary in summaries {
            let index = if summary.index > 0 {
                summary.index
            } else {
                tracker.counter + 1
            };
            tracker.counter = tracker.counter.max(index);
            tracker
                .jobs
                .insert(summary.id, TrackedJob::from_summary(summary, index));
        }

        tracker.focused = snapshot
            .active_job_id
            .filter(|id| tracker.jobs.contains_key(id))
            .or_else(|| tracker.highest_index_job());
        tracker
    }

    fn load_snapshot(&self) -> Option<JobsSnapshot> {
        let raw = match self.store.get_item(JOBS_STORAGE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "failed to read job snapshot");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "ignoring corrupt job snapshot");
                None
            }
        }
    }

    /// Start tracking a job under the next display index and focus it.
    ///
    /// Registering an id that is already tracked only refreshes its
    /// metadata and focus; the index is kept.
    pub fn register_job(&mut self, id: Uuid, meta: JobMeta) -> u64 {
        let logs: Vec<String> = meta.initial_log.into_iter().collect();

        let index = match self.jobs.get_mut(&id) {
            Some(job) => {
                job.title = meta.title;
                job.subtitle = meta.subtitle;
                job.index
            }
            None => {
                self.counter += 1;
                self.jobs.insert(
                    id,
                    TrackedJob {
                        id,
                        index: self.counter,
                        title: non_empty_or(meta.title, "Job"),
                        subtitle: meta.subtitle,
                        status: JobStatus::Running,
                        deployment_id: None,
                        logs,
                    },
                );
                self.counter
            }
        };

        self.focused = Some(id);
        self.persist();
        index
    }

    /// Apply a server snapshot. Returns `false` for untracked ids.
    pub fn update_from_server(&mut self, id: Uuid, view: &JobView) -> bool {
        let Some(job) = self.jobs.get_mut(&id) else {
            return false;
        };
        job.status = view.status;
        if view.deployment_id.is_some() {
            job.deployment_id.clone_from(&view.deployment_id);
        }
        job.logs.clone_from(&view.logs);
        self.persist();
        true
    }

    /// Synthetic failure after a failed read: status becomes `failed` and
    /// `message` is appended to the log.
    pub fn mark_failed(&mut self, id: Uuid, message: &str) -> bool {
        let Some(job) = self.jobs.get_mut(&id) else {
            return false;
        };
        job.status = JobStatus::Failed;
        job.logs.push(format!("{message}\n"));
        self.persist();
        true
    }

    /// Stop tracking a job. Focus moves to the highest remaining index
    /// when the closed job was focused.
    pub fn close_job(&mut self, id: Uuid) -> bool {
        if self.jobs.remove(&id).is_none() {
            return false;
        }
        if self.focused == Some(id) || self.jobs.is_empty() {
            self.focused = self.highest_index_job();
        }
        self.persist();
        true
    }

    /// Focus a tracked job. Unknown ids leave focus unchanged.
    pub fn focus(&mut self, id: Uuid) -> bool {
        if !self.jobs.contains_key(&id) {
            return false;
        }
        self.focused = Some(id);
        self.persist();
        true
    }

    /// Forget every job and remove the snapshot.
    pub fn clear(&mut self) {
        self.jobs.clear();
        self.focused = None;
        self.persist();
    }

    pub fn focused(&self) -> Option<Uuid> {
        self.focused
    }

    pub fn get(&self, id: Uuid) -> Option<&TrackedJob> {
        self.jobs.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.jobs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Index the next registered job will get.
    pub fn next_index(&self) -> u64 {
        self.counter + 1
    }

    pub fn list_ordered(&self) -> Vec<&TrackedJob> {
        let mut jobs: Vec<_> = self.jobs.values().collect();
        jobs.sort_by_key(|job| job.index);
        jobs
    }

    pub fn view(&self, id: Uuid) -> Option<JobDisplay> {
        let job = self.jobs.get(&id)?;
        let status_line = job.status_line();
        let subtitle = if job.subtitle.is_empty() {
            status_line
        } else {
            format!("{} • {status_line}", job.subtitle)
        };
        Some(JobDisplay {
            index: job.index,
            title: job.title.clone(),
            subtitle,
            log_text: job.log_text(),
            focused: self.focused == Some(id),
        })
    }

    pub fn snapshot(&self) -> JobsSnapshot {
        JobsSnapshot {
            active_job_id: self.focused,
            jobs: self
                .list_ordered()
                .into_iter()
                .map(TrackedJob::summary)
                .collect(),
        }
    }

    fn highest_index_job(&self) -> Option<Uuid> {
        self.jobs.values().max_by_key(|job| job.index).map(|job| job.id)
    }

    fn persist(&self) {
        let result = if self.jobs.is_empty() {
            self.store.remove_item(JOBS_STORAGE_KEY)
        } else {
            match serde_json::to_string(&self.snapshot()) {
                Ok(json) => self.store.set_item(JOBS_STORAGE_KEY, &json),
                Err(e) => {
                    warn!(error = %e, "failed to encode job snapshot");
                    return;
                }
            }
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist job snapshot");
        }
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
