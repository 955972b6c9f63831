//! Job state models.
//!
//! A job is one fire-and-forget invocation of an external command. The
//! server owns the authoritative record; everything handed across the wire
//! is an immutable [`JobView`] snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

/// Lifecycle status of a job.
///
/// The only legal transitions are `Running -> Completed` and
/// `Running -> Failed`, each taken at most once.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The child process has been spawned (or is being spawned) and has not exited.
    Running,

    /// The child process exited with code zero.
    Completed,

    /// The child process exited non-zero, was killed, or could not be spawned.
    Failed,
}

impl JobStatus {
    /// Whether no further transitions can happen from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a job as returned by `GET /api/jobs/:id`.
///
/// `logs` always carries the full output accumulated so far, not a delta.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct JobView {
    #[ts(type = "string")]
    pub id: Uuid,

    pub status: JobStatus,

    /// Human-readable command line (`program arg1 arg2 ...`).
    pub command: String,

    pub created_at: DateTime<Utc>,

    /// Set together with the terminal status.
    pub completed_at: Option<DateTime<Utc>>,

    /// Set together with the terminal status. `None` after a signal kill.
    pub exit_code: Option<i32>,

    /// Deployment id scraped from the output, captured on first match.
    pub deployment_id: Option<String>,

    /// Output chunks in arrival order, stdout and stderr interleaved.
    pub logs: Vec<String>,
}

impl JobView {
    /// Concatenated output, the way an operator reads it.
    pub fn log_text(&self) -> String {
        self.logs.concat()
    }
}

/// Response body of every start-job endpoint (`202 Accepted`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StartJobResponse {
    #[ts(type = "string")]
    pub job_id: Uuid,
    pub status: JobStatus,
    pub command: String,
}

impl From<&JobView> for StartJobResponse {
    fn from(view: &JobView) -> Self {
        Self {
            job_id: view.id,
            status: view.status,
            command: view.command.clone(),
        }
    }
}

/// Response body of `GET /api/jobs`.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct JobsResponse {
    pub jobs: Vec<JobView>,
}
