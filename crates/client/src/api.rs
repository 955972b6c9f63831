//! Transport to the dashboard server.
//!
//! [`DashboardApi`] is the seam the tracker, poller and shell controller
//! talk through; [`HttpApi`] is the production implementation.

use async_trait::async_trait;
use reqwest::{Client, IntoUrl, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::pin::Pin;
use tfd_protocol::command_models::{CommandRequest, DirectRunRequest};
use tfd_protocol::deployment_models::{
    DeployRequest, Deployment, DeploymentsResponse, ErrorResponse, PreferencesResponse,
    ProjectAction, ProjectActionRequest,
};
use tfd_protocol::job_models::{JobView, JobsResponse, StartJobResponse};
use tfd_protocol::shell_models::{
    AckResponse, OpenShellResponse, ShellInputRequest, ShellMessage,
};
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::sse::SseDecoder;

/// Shell output as decoded messages. Ends after [`ShellMessage::Close`] or
/// when the connection drops.
pub type ShellStream = Pin<Box<dyn Stream<Item = ClientResult<ShellMessage>> + Send>>;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Full snapshot of a job. [`ClientError::NotFound`] when the server
    /// does not know the id.
    async fn get_job(&self, job_id: Uuid) -> ClientResult<JobView>;

    async fn list_jobs(&self) -> ClientResult<Vec<JobView>>;

    async fn deploy(&self, app_name: &str) -> ClientResult<StartJobResponse>;

    async fn run_command(&self, request: &CommandRequest) -> ClientResult<StartJobResponse>;

    async fn run_direct(&self, line: &str) -> ClientResult<StartJobResponse>;

    async fn project_action(
        &self,
        deployment_id: &str,
        action: ProjectAction,
        project_name: &str,
    ) -> ClientResult<StartJobResponse>;

    async fn open_shell(&self, target: &str) -> ClientResult<Uuid>;

    async fn shell_stream(&self, session_id: Uuid) -> ClientResult<ShellStream>;

    async fn send_shell_input(&self, session_id: Uuid, data: &str) -> ClientResult<()>;

    async fn close_shell(&self, session_id: Uuid) -> ClientResult<()>;

    async fn list_deployments(&self) -> ClientResult<Vec<Deployment>>;

    async fn preferences(&self) -> ClientResult<PreferencesResponse>;
}

/// HTTP implementation of [`DashboardApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `/api/deployments/{id}/{action}` with the id kept as a single
    /// percent-encoded path segment.
    fn deployment_url(&self, deployment_id: &str, action: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "deployments", deployment_id, action]);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.post_json_to(self.url(path), body).await
    }

    async fn post_json_to<U, B, T>(&self, url: U, body: &B) -> ClientResult<T>
    where
        U: IntoUrl + Send,
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

/// Map a response to `T`, turning error statuses into [`ClientError`].
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|err| match err.details {
            Some(details) => format!("{}: {details}", err.error),
            None => err.error,
        })
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    Err(ClientError::Status {
        code: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn get_job(&self, job_id: Uuid) -> ClientResult<JobView> {
        self.get_json(&format!("/api/jobs/{job_id}")).await
    }

    async fn list_jobs(&self) -> ClientResult<Vec<JobView>> {
        let response: JobsResponse = self.get_json("/api/jobs").await?;
        Ok(response.jobs)
    }

    async fn deploy(&self, app_name: &str) -> ClientResult<StartJobResponse> {
        let body = DeployRequest {
            app_name: Some(app_name.to_string()),
        };
        self.post_json("/api/deployments", &body).await
    }

    async fn run_command(&self, request: &CommandRequest) -> ClientResult<StartJobResponse> {
        self.post_json("/api/commands/run", request).await
    }

    async fn run_direct(&self, line: &str) -> ClientResult<StartJobResponse> {
        let body = DirectRunRequest {
            line: line.to_string(),
        };
        self.post_json("/api/commands/run-direct", &body).await
    }

    async fn project_action(
        &self,
        deployment_id: &str,
        action: ProjectAction,
        project_name: &str,
    ) -> ClientResult<StartJobResponse> {
        let body = ProjectActionRequest {
            project_name: Some(project_name.to_string()),
        };
        let url = self.deployment_url(deployment_id, &action.to_string())?;
        self.post_json_to(url, &body).await
    }

    async fn open_shell(&self, target: &str) -> ClientResult<Uuid> {
        let url = self.deployment_url(target, "shell")?;
        let response: OpenShellResponse = self.post_json_to(url, &serde_json::json!({})).await?;
        Ok(response.session_id)
    }

    async fn shell_stream(&self, session_id: Uuid) -> ClientResult<ShellStream> {
        let response = self
            .client
            .get(self.url(&format!("/api/shells/{session_id}/stream")))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = check_status(response).await?;

        let mut bytes = Box::pin(response.bytes_stream());
        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ClientError::Http(e));
                        return;
                    }
                };
                for message in decoder.feed(&chunk) {
                    let closed = message == ShellMessage::Close;
                    yield Ok(message);
                    if closed {
                        return;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }

    async fn send_shell_input(&self, session_id: Uuid, data: &str) -> ClientResult<()> {
        let body = ShellInputRequest {
            data: data.to_string(),
        };
        let _: AckResponse = self
            .post_json(&format!("/api/shells/{session_id}/input"), &body)
            .await?;
        Ok(())
    }

    async fn close_shell(&self, session_id: Uuid) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/api/shells/{session_id}/close")))
            .send()
            .await?;
        let _: AckResponse = decode(response).await?;
        Ok(())
    }

    async fn list_deployments(&self) -> ClientResult<Vec<Deployment>> {
        let response: DeploymentsResponse = self.get_json("/api/deployments").await?;
        Ok(response.deployments)
    }

    async fn preferences(&self) -> ClientResult<PreferencesResponse> {
        self.get_json("/api/preferences").await
    }
}
