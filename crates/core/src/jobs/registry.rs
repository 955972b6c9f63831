//! Job registry: the single source of truth for jobs polled by clients.
//!
//! Creating a job returns immediately; the child process is driven by a
//! background task that folds its events into the job record.

use std::collections::HashMap;
use std::sync::Arc;
use tfd_protocol::job_models::JobView;
use tokio::sync::Mutex;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::jobs::job::{self, Job};
use crate::runner::{ProcessEvent, ProcessRunner};

/// Owns every job started during the server's lifetime.
///
/// Jobs are never removed; callers only ever see [`JobView`] snapshots.
#[derive(Clone)]
pub struct JobRegistry {
    /// All jobs, indexed by id.
    ///
    /// Each job has its own lock so output from one child never waits on
    /// readers of another.
    jobs: Arc<Mutex<HashMap<Uuid, Arc<Mutex<Job>>>>>,

    runner: ProcessRunner,
}

impl JobRegistry {
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            runner,
        }
    }

    /// Register a job and start its process in the background.
    ///
    /// Never fails and never waits for the child: the returned snapshot is
    /// always `running`. A program that cannot be spawned shows up later as
    /// a failed job with an `ERROR:` line.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn create_job(&self, program: &str, args: &[String]) -> JobView {
        let job = job::create_job(program, args);
        let job_id = job.id();
        let view = job.view();
        let job = Arc::new(Mutex::new(job));

        self.jobs.lock().await.insert(job_id, Arc::clone(&job));
        info!(%job_id, command = %view.command, "job started");

        let events = self.runner.execute(program, args);
        tokio::spawn(drive_job(job, events));

        view
    }

    /// Snapshot of one job.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::JobNotFound`] for an unknown id.
    pub async fn get_job(&self, job_id: Uuid) -> RegistryResult<JobView> {
        let job = {
            let jobs = self.jobs.lock().await;
            jobs.get(&job_id).cloned()
        };
        let Some(job) = job else {
            return Err(RegistryError::JobNotFound(job_id));
        };
        let view = job.lock().await.view();
        Ok(view)
    }

    /// Snapshots of all jobs, oldest first.
    pub async fn list_jobs(&self) -> Vec<JobView> {
        let handles: Vec<_> = self.jobs.lock().await.values().cloned().collect();

        let mut views = Vec::with_capacity(handles.len());
        for job in handles {
            views.push(job.lock().await.view());
        }
        views.sort_by_key(|view| view.created_at);
        views
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }
}

async fn drive_job(job: Arc<Mutex<Job>>, mut events: crate::runner::ProcessEvents) {
    while let Some(event) = events.next().await {
        let mut job = job.lock().await;
        match event {
            ProcessEvent::Output(chunk) => job::append_output(&mut job, chunk),
            ProcessEvent::Exited(code) => {
                if job::finish_job(&mut job, code) {
                    info!(
                        job_id = %job.id(),
                        status = %job.status(),
                        exit_code = ?code,
                        "job finished"
                    );
                }
            }
            ProcessEvent::SpawnFailed(message) => {
                warn!(job_id = %job.id(), program = job.program(), %message, "job failed to spawn");
                job::fail_to_spawn(&mut job, &message);
            }
        }
    }
}
