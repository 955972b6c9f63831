//! Job record and its state transitions.
//!
//! A job starts `Running` and moves to `Completed` or `Failed` exactly once.
//! Output is append-only. Every transition here is a plain function over
//! `&mut Job`; the registry decides when to call them.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use tfd_protocol::job_models::{JobStatus, JobView};
use uuid::Uuid;

use crate::runner::SPAWN_FAILURE_EXIT_CODE;

/// Mutable server-side job record. Only ever exposed as a [`JobView`].
#[derive(Debug, Clone)]
pub struct Job {
    id: Uuid,
    program: String,
    args: Vec<String>,
    status: JobStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    exit_code: Option<i32>,
    deployment_id: Option<String>,
    logs: Vec<String>,
}

impl Job {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `program arg1 arg2 ...`, for display only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Immutable snapshot handed to callers.
    pub fn view(&self) -> JobView {
        JobView {
            id: self.id,
            status: self.status,
            command: self.command_line(),
            created_at: self.created_at,
            completed_at: self.completed_at,
            exit_code: self.exit_code,
            deployment_id: self.deployment_id.clone(),
            logs: self.logs.clone(),
        }
    }
}

/// Create a new job in `Running` status with a fresh id.
pub fn create_job(program: &str, args: &[String]) -> Job {
    Job {
        id: Uuid::new_v4(),
        program: program.to_string(),
        args: args.to_vec(),
        status: JobStatus::Running,
        created_at: Utc::now(),
        completed_at: None,
        exit_code: None,
        deployment_id: None,
        logs: Vec::new(),
    }
}

fn deployment_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"Registered deployment: ([a-f0-9]{16})").unwrap_or_else(|e| {
            unreachable!("deployment marker pattern is a valid literal: {e}")
        })
    })
}

/// Extract the deployment id from a "Registered deployment" marker line.
pub fn extract_deployment_id(chunk: &str) -> Option<&str> {
    deployment_marker()
        .captures(chunk)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Append one output chunk verbatim.
///
/// The chunk is scanned for the deployment marker; only the first match
/// over the job's lifetime is kept.
pub fn append_output(job: &mut Job, chunk: String) {
    if job.deployment_id.is_none() {
        if let Some(id) = extract_deployment_id(&chunk) {
            job.deployment_id = Some(id.to_string());
        }
    }
    job.logs.push(chunk);
}

/// Record the exit of the child process.
///
/// Exit code zero completes the job; anything else, including a signal
/// (`None`), fails it. Returns `false` if the job was already terminal.
pub fn finish_job(job: &mut Job, exit_code: Option<i32>) -> bool {
    if job.status.is_terminal() {
        return false;
    }
    job.status = if exit_code == Some(0) {
        JobStatus::Completed
    } else {
        JobStatus::Failed
    };
    job.exit_code = exit_code;
    job.completed_at = Some(Utc::now());
    true
}

/// Record that the program could not be started.
///
/// Appends an `ERROR:` line and fails the job with the spawn-failure
/// sentinel exit code. Returns `false` if the job was already terminal.
pub fn fail_to_spawn(job: &mut Job, message: &str) -> bool {
    if job.status.is_terminal() {
        return false;
    }
    job.logs.push(format!("ERROR: {message}"));
    job.status = JobStatus::Failed;
    job.exit_code = Some(SPAWN_FAILURE_EXIT_CODE);
    job.completed_at = Some(Utc::now());
    true
}
