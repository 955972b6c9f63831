//! Interactive shell control: one session at a time.

use std::sync::Arc;
use tfd_protocol::shell_models::ShellMessage;
use tokio_stream::StreamExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{DashboardApi, ShellStream};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveShell {
    pub session_id: Uuid,
    pub target: String,
}

/// Owns the current shell session and its event stream.
///
/// Opening a new session first unsubscribes from the old one and asks the
/// server to close it. That close is best-effort.
pub struct ShellController {
    api: Arc<dyn DashboardApi>,
    active: Option<ActiveShell>,
    stream: Option<ShellStream>,
}

impl ShellController {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            active: None,
            stream: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveShell> {
        self.active.as_ref()
    }

    pub async fn open(&mut self, target: &str) -> ClientResult<Uuid> {
        self.close().await;

        let session_id = self
            .api
            .open_shell(target)
            .await
            .map_err(|e| ClientError::start("shell", e))?;

        let stream = match self.api.shell_stream(session_id).await {
            Ok(stream) => stream,
            Err(e) => {
                self.close_remote(session_id).await;
                return Err(e);
            }
        };

        info!(%session_id, target, "shell opened");
        self.active = Some(ActiveShell {
            session_id,
            target: target.to_string(),
        });
        self.stream = Some(stream);
        Ok(session_id)
    }

    /// Next message of the active session.
    ///
    /// `None` once there is no session or its stream has ended. A close
    /// message ends the session locally.
    pub async fn next_message(&mut self) -> Option<ClientResult<ShellMessage>> {
        let stream = self.stream.as_mut()?;
        let next = stream.next().await;
        match &next {
            Some(Ok(ShellMessage::Close)) | None => {
                self.stream = None;
                self.active = None;
            }
            _ => {}
        }
        next
    }

    /// Send one trimmed line with a trailing newline.
    ///
    /// Returns `false` without a request when the line is blank or no
    /// session is active.
    pub async fn send_line(&self, input: &str) -> ClientResult<bool> {
        let line = input.trim();
        if line.is_empty() {
            return Ok(false);
        }
        let Some(active) = &self.active else {
            return Ok(false);
        };
        self.api
            .send_shell_input(active.session_id, &format!("{line}\n"))
            .await?;
        Ok(true)
    }

    /// Unsubscribe and close the active session, if any.
    pub async fn close(&mut self) {
        self.stream = None;
        if let Some(active) = self.active.take() {
            self.close_remote(active.session_id).await;
        }
    }

    async fn close_remote(&self, session_id: Uuid) {
        if let Err(e) = self.api.close_shell(session_id).await {
            debug!(%session_id, error = %e, "shell close failed");
        }
    }
}
