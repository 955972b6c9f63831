//! Durable client-side snapshot of tracked jobs.
//!
//! The client persists this document after every mutation of its job set
//! and reads it back on start-up. Log text is deliberately absent; it is
//! re-fetched from the server instead.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::job_models::JobStatus;

/// Fixed storage key the snapshot is kept under.
pub const JOBS_STORAGE_KEY: &str = "tfgrid-dashboard-jobs-v1";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct JobsSnapshot {
    /// Focused job, if any.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub active_job_id: Option<Uuid>,

    pub jobs: Vec<JobSummary>,
}

/// Display metadata for one tracked job.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct JobSummary {
    #[ts(type = "string")]
    pub id: Uuid,

    /// Display index; `0` means the writer never assigned one.
    #[serde(default)]
    pub index: u64,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub subtitle: String,

    #[serde(default = "default_status")]
    pub status: JobStatus,

    #[serde(default)]
    pub deployment_id: Option<String>,
}

fn default_title() -> String {
    "Job".to_string()
}

fn default_status() -> JobStatus {
    JobStatus::Running
}
