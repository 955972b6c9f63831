//! Scripted stand-in for the dashboard server.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tfd_client::{ClientError, ClientResult, DashboardApi, RefreshHook, ShellStream};
use tfd_protocol::command_models::CommandRequest;
use tfd_protocol::deployment_models::{Deployment, PreferencesResponse, ProjectAction};
use tfd_protocol::job_models::{JobStatus, JobView, StartJobResponse};
use tfd_protocol::shell_models::ShellMessage;
use uuid::Uuid;

/// One scripted answer to `get_job`.
#[derive(Debug, Clone)]
pub enum Reply {
    Job(JobStatus, Vec<&'static str>),
    NotFound,
    Error(&'static str),
}

/// In-memory [`DashboardApi`] whose job reads follow a per-job script.
///
/// The last reply of a script repeats forever. Unscripted jobs are unknown.
#[derive(Default)]
pub struct FakeApi {
    scripts: Mutex<HashMap<Uuid, VecDeque<Reply>>>,
    reads: Mutex<HashMap<Uuid, usize>>,
    start_error: Mutex<Option<&'static str>>,
    next_job: Mutex<VecDeque<Uuid>>,
    started: Mutex<Vec<String>>,
    shell_script: Mutex<Vec<ShellMessage>>,
    opened_shells: Mutex<Vec<(Uuid, String)>>,
    shell_inputs: Mutex<Vec<(Uuid, String)>>,
    closed_shells: Mutex<Vec<Uuid>>,
    deployments: Mutex<Vec<Deployment>>,
    deployment_reads: AtomicUsize,
    preference_reads: AtomicUsize,
    fail_views: Mutex<bool>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, job_id: Uuid, replies: Vec<Reply>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(job_id, replies.into());
    }

    /// The id handed out by the next start request.
    pub fn queue_job(&self, job_id: Uuid, replies: Vec<Reply>) {
        self.script(job_id, replies);
        self.next_job.lock().unwrap().push_back(job_id);
    }

    pub fn fail_starts(&self, message: &'static str) {
        *self.start_error.lock().unwrap() = Some(message);
    }

    pub fn reads(&self, job_id: Uuid) -> usize {
        self.reads.lock().unwrap().get(&job_id).copied().unwrap_or(0)
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn set_shell_output(&self, messages: Vec<ShellMessage>) {
        *self.shell_script.lock().unwrap() = messages;
    }

    pub fn opened_shells(&self) -> Vec<(Uuid, String)> {
        self.opened_shells.lock().unwrap().clone()
    }

    pub fn shell_inputs(&self) -> Vec<(Uuid, String)> {
        self.shell_inputs.lock().unwrap().clone()
    }

    pub fn closed_shells(&self) -> Vec<Uuid> {
        self.closed_shells.lock().unwrap().clone()
    }

    pub fn set_deployments(&self, deployments: Vec<Deployment>) {
        *self.deployments.lock().unwrap() = deployments;
    }

    pub fn fail_views(&self, fail: bool) {
        *self.fail_views.lock().unwrap() = fail;
    }

    pub fn deployment_reads(&self) -> usize {
        self.deployment_reads.load(Ordering::SeqCst)
    }

    pub fn preference_reads(&self) -> usize {
        self.preference_reads.load(Ordering::SeqCst)
    }

    fn views_error(&self) -> Option<ClientError> {
        (*self.fail_views.lock().unwrap()).then(|| ClientError::Status {
            code: 500,
            message: "Failed to read state".to_string(),
        })
    }

    fn start(&self, command: String) -> ClientResult<StartJobResponse> {
        if let Some(message) = *self.start_error.lock().unwrap() {
            return Err(ClientError::Status {
                code: 400,
                message: message.to_string(),
            });
        }
        self.started.lock().unwrap().push(command.clone());
        let job_id = self
            .next_job
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Uuid::new_v4);
        Ok(StartJobResponse {
            job_id,
            status: JobStatus::Running,
            command,
        })
    }
}

pub fn job_view(job_id: Uuid, status: JobStatus, logs: &[&str]) -> JobView {
    JobView {
        id: job_id,
        status,
        command: "tfgrid-compose up wordpress".to_string(),
        created_at: Utc::now(),
        completed_at: status.is_terminal().then(Utc::now),
        exit_code: match status {
            JobStatus::Running => None,
            JobStatus::Completed => Some(0),
            JobStatus::Failed => Some(1),
        },
        deployment_id: None,
        logs: logs.iter().map(|s| s.to_string()).collect(),
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn get_job(&self, job_id: Uuid) -> ClientResult<JobView> {
        *self.reads.lock().unwrap().entry(job_id).or_default() += 1;

        let reply = {
            let mut scripts = self.scripts.lock().unwrap();
            let Some(script) = scripts.get_mut(&job_id) else {
                return Err(ClientError::NotFound);
            };
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        match reply {
            Some(Reply::Job(status, logs)) => Ok(job_view(job_id, status, &logs)),
            Some(Reply::Error(message)) => Err(ClientError::Status {
                code: 500,
                message: message.to_string(),
            }),
            Some(Reply::NotFound) | None => Err(ClientError::NotFound),
        }
    }

    async fn list_jobs(&self) -> ClientResult<Vec<JobView>> {
        Ok(Vec::new())
    }

    async fn deploy(&self, app_name: &str) -> ClientResult<StartJobResponse> {
        self.start(format!("tfgrid-compose up {app_name}"))
    }

    async fn run_command(&self, request: &CommandRequest) -> ClientResult<StartJobResponse> {
        self.start(format!("tfgrid-compose {}", request.command_id))
    }

    async fn run_direct(&self, line: &str) -> ClientResult<StartJobResponse> {
        self.start(format!("tfgrid-compose {line}"))
    }

    async fn project_action(
        &self,
        deployment_id: &str,
        action: ProjectAction,
        project_name: &str,
    ) -> ClientResult<StartJobResponse> {
        self.start(format!("tfgrid-compose {action} {project_name} ({deployment_id})"))
    }

    async fn open_shell(&self, target: &str) -> ClientResult<Uuid> {
        let session_id = Uuid::new_v4();
        self.opened_shells
            .lock()
            .unwrap()
            .push((session_id, target.to_string()));
        Ok(session_id)
    }

    async fn shell_stream(&self, _session_id: Uuid) -> ClientResult<ShellStream> {
        let messages: Vec<ClientResult<ShellMessage>> = self
            .shell_script
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(Ok)
            .collect();
        Ok(Box::pin(tokio_stream::iter(messages)))
    }

    async fn send_shell_input(&self, session_id: Uuid, data: &str) -> ClientResult<()> {
        self.shell_inputs
            .lock()
            .unwrap()
            .push((session_id, data.to_string()));
        Ok(())
    }

    async fn close_shell(&self, session_id: Uuid) -> ClientResult<()> {
        self.closed_shells.lock().unwrap().push(session_id);
        Ok(())
    }

    async fn list_deployments(&self) -> ClientResult<Vec<Deployment>> {
        self.deployment_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.views_error() {
            return Err(e);
        }
        Ok(self.deployments.lock().unwrap().clone())
    }

    async fn preferences(&self) -> ClientResult<PreferencesResponse> {
        self.preference_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.views_error() {
            return Err(e);
        }
        Ok(PreferencesResponse::default())
    }
}

/// Counts refresh calls.
#[derive(Default)]
pub struct CountingRefresh {
    calls: AtomicUsize,
}

impl CountingRefresh {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshHook for CountingRefresh {
    async fn refresh(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
