//! Starting jobs, rehydrating them after a restart and owning their pollers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tfd_protocol::command_models::CommandRequest;
use tfd_protocol::deployment_models::ProjectAction;
use tfd_protocol::job_models::StartJobResponse;
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::DashboardApi;
use crate::error::{ClientError, ClientResult};
use crate::poller::{JobPoller, PollState, RefreshHook, SharedTracker, POLL_INTERVAL};
use crate::tracker::{JobMeta, JobTracker};

/// Outcome of reconciling restored jobs with the server.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RehydrateReport {
    /// Jobs the server still knows about.
    pub restored: Vec<Uuid>,
    /// Jobs the server no longer knows; dropped from the tracker.
    pub dropped: Vec<Uuid>,
    /// Restored jobs still running; polling resumed.
    pub resumed: Vec<Uuid>,
    /// Jobs whose read failed for another reason; marked failed.
    pub failed: Vec<Uuid>,
}

pub struct JobSupervisor {
    api: Arc<dyn DashboardApi>,
    tracker: SharedTracker,
    hook: Arc<dyn RefreshHook>,
    interval: Duration,
    pollers: StdMutex<HashMap<Uuid, JoinHandle<PollState>>>,
}

impl JobSupervisor {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        tracker: JobTracker,
        hook: Arc<dyn RefreshHook>,
    ) -> Self {
        Self {
            api,
            tracker: Arc::new(Mutex::new(tracker)),
            hook,
            interval: POLL_INTERVAL,
            pollers: StdMutex::new(HashMap::new()),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn api(&self) -> Arc<dyn DashboardApi> {
        Arc::clone(&self.api)
    }

    pub fn tracker(&self) -> SharedTracker {
        Arc::clone(&self.tracker)
    }

    pub async fn deploy(&self, app_name: &str) -> ClientResult<Uuid> {
        let response = self
            .api
            .deploy(app_name)
            .await
            .map_err(|e| ClientError::start("deployment", e))?;
        let meta = JobMeta {
            title: format!("Deploying {app_name}"),
            subtitle: "Running tfgrid-compose up".to_string(),
            initial_log: Some("Starting deployment job...".to_string()),
        };
        Ok(self.track_started(response, meta).await)
    }

    /// `title` defaults to the command id.
    pub async fn run_command(
        &self,
        request: &CommandRequest,
        title: Option<&str>,
    ) -> ClientResult<Uuid> {
        let response = self
            .api
            .run_command(request)
            .await
            .map_err(|e| ClientError::start("command", e))?;
        let meta = JobMeta {
            title: title.unwrap_or(&request.command_id).to_string(),
            subtitle: response.command.clone(),
            initial_log: Some("Starting command job...".to_string()),
        };
        Ok(self.track_started(response, meta).await)
    }

    pub async fn run_direct(&self, line: &str) -> ClientResult<Uuid> {
        let response = self
            .api
            .run_direct(line)
            .await
            .map_err(|e| ClientError::start("direct command", e))?;
        let meta = JobMeta {
            title: "Direct tfgrid-compose".to_string(),
            subtitle: format!("tfgrid-compose {}", line.trim()),
            initial_log: Some("Starting direct command job...".to_string()),
        };
        Ok(self.track_started(response, meta).await)
    }

    pub async fn project_action(
        &self,
        deployment_id: &str,
        action: ProjectAction,
        project_name: &str,
    ) -> ClientResult<Uuid> {
        let response = self
            .api
            .project_action(deployment_id, action, project_name)
            .await
            .map_err(|e| ClientError::start(action.as_str(), e))?;
        let meta = JobMeta {
            title: format!("{} {project_name}", action.label()),
            subtitle: format!("Deployment {deployment_id}"),
            initial_log: Some(format!("Starting tfgrid-compose {action} {project_name}...")),
        };
        Ok(self.track_started(response, meta).await)
    }

    async fn track_started(&self, response: StartJobResponse, meta: JobMeta) -> Uuid {
        let job_id = response.job_id;
        let index = self.tracker.lock().await.register_job(job_id, meta);
        info!(%job_id, index, command = %response.command, "tracking job");
        self.start_polling(job_id);
        job_id
    }

    /// Spawn a poller unless one is already running for this job.
    pub fn start_polling(&self, job_id: Uuid) {
        let mut pollers = self.lock_pollers();
        if pollers.get(&job_id).is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let poller = JobPoller::new(job_id, Arc::clone(&self.api), self.tracker())
            .with_interval(self.interval);
        let handle = tokio::spawn(poller.run(Arc::clone(&self.hook)));
        pollers.insert(job_id, handle);
    }

    /// Reconcile every restored job with one immediate read.
    ///
    /// Unknown jobs are dropped, other read failures mark the job failed,
    /// and jobs still running resume polling.
    pub async fn rehydrate(&self) -> RehydrateReport {
        let ids: Vec<Uuid> = {
            let tracker = self.tracker.lock().await;
            tracker.list_ordered().iter().map(|job| job.id).collect()
        };

        let mut reads = JoinSet::new();
        for job_id in ids {
            let api = Arc::clone(&self.api);
            reads.spawn(async move { (job_id, api.get_job(job_id).await) });
        }

        let mut report = RehydrateReport::default();
        while let Some(joined) = reads.join_next().await {
            let (job_id, result) = match joined {
                Ok(read) => read,
                Err(e) => {
                    warn!(error = %e, "rehydration read task failed");
                    continue;
                }
            };

            let mut tracker = self.tracker.lock().await;
            match result {
                Ok(view) => {
                    tracker.update_from_server(job_id, &view);
                    report.restored.push(job_id);
                    if !view.status.is_terminal() {
                        report.resumed.push(job_id);
                    }
                }
                Err(e) if e.is_not_found() => {
                    info!(%job_id, "dropping job unknown to the server");
                    tracker.close_job(job_id);
                    report.dropped.push(job_id);
                }
                Err(e) => {
                    warn!(%job_id, error = %e, "failed to restore job");
                    tracker.mark_failed(job_id, &format!("Failed to fetch job: {e}"));
                    report.failed.push(job_id);
                }
            }
        }

        for job_id in &report.resumed {
            self.start_polling(*job_id);
        }
        report
    }

    /// Wait for a job's poller to finish. `None` when no poller was started.
    pub async fn wait(&self, job_id: Uuid) -> Option<PollState> {
        let handle = self.lock_pollers().remove(&job_id)?;
        match handle.await {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(%job_id, error = %e, "poll task failed");
                None
            }
        }
    }

    /// Stop tracking a job; its poller ends on its next tick.
    pub async fn close_job(&self, job_id: Uuid) -> bool {
        self.tracker.lock().await.close_job(job_id)
    }

    pub async fn clear(&self) {
        self.tracker.lock().await.clear();
    }

    fn lock_pollers(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, JoinHandle<PollState>>> {
        self.pollers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for JobSupervisor {
    fn drop(&mut self) {
        for handle in self.lock_pollers().values() {
            handle.abort();
        }
    }
}
