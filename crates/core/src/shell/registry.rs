//! Shell session registry.
//!
//! Sessions live here from `open_session` until they are closed explicitly
//! or their subprocess exits. A session that ends before any viewer
//! attached (spawn failure, or a shell that exits straight away) stays
//! registered, already closed, until its first viewer has drained the
//! replay and the close.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::runner::{ProcessEvent, ProcessEvents, ProcessRunner};
use crate::shell::session::{ShellSession, Viewer};

/// Placeholder replaced by the deployment id in shell arguments.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// How a shell subprocess is launched for a given target.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    program: String,
    args: Vec<String>,
}

impl ShellLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with every `{target}` occurrence substituted.
    pub fn args_for(&self, target: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, target))
            .collect()
    }
}

/// Owns every open shell session.
#[derive(Clone)]
pub struct ShellRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Arc<ShellSession>>>>,
    runner: ProcessRunner,
    launcher: ShellLauncher,
}

impl ShellRegistry {
    pub fn new(runner: ProcessRunner, launcher: ShellLauncher) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            runner,
            launcher,
        }
    }

    /// Start a shell against `target` and return its session id.
    ///
    /// Never fails: a subprocess that cannot be spawned yields a closed
    /// session whose only output is an `ERROR:` line.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open_session(&self, target: &str) -> Uuid {
        let program = self.launcher.program();
        let args = self.launcher.args_for(target);

        match self.runner.spawn(program, &args) {
            Ok(mut process) => {
                let kill = process.kill_handle();
                let stdin = process.stdin.take();
                let session = Arc::new(ShellSession::new(target, stdin, kill));
                let session_id = session.id();

                self.sessions
                    .lock()
                    .await
                    .insert(session_id, Arc::clone(&session));
                info!(%session_id, target, pid = ?process.pid, "shell session opened");

                tokio::spawn(drive_session(
                    Arc::clone(&self.sessions),
                    session,
                    process.events,
                ));
                session_id
            }
            Err(e) => {
                let message = format!("Failed to spawn {program}: {e}");
                warn!(target, %message, "shell session failed to start");

                let session = Arc::new(ShellSession::failed(target, &message));
                let session_id = session.id();
                self.sessions.lock().await.insert(session_id, session);
                session_id
            }
        }
    }

    /// Attach a viewer to a session: full replay, then live output.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id.
    pub async fn attach(&self, session_id: Uuid) -> RegistryResult<Viewer> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get(&session_id).cloned() else {
            return Err(RegistryError::SessionNotFound(session_id));
        };

        let viewer = session.attach();
        if session.is_closed() {
            sessions.remove(&session_id);
        }
        Ok(viewer)
    }

    /// Stop delivering output to `viewer`. Other viewers are unaffected.
    pub fn detach(&self, viewer: Viewer) {
        drop(viewer);
    }

    /// Write raw text to a session's stdin.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SessionNotFound`] for an unknown id and
    /// [`RegistryError::SessionClosed`] when the session can no longer
    /// accept input.
    pub async fn send_input(&self, session_id: Uuid, text: &str) -> RegistryResult<()> {
        let session = self.get(session_id).await?;
        session.write_input(text).await
    }

    /// Close a session. Unknown or already closed ids are a no-op.
    pub async fn close(&self, session_id: Uuid) {
        let session = self.sessions.lock().await.remove(&session_id);
        if let Some(session) = session {
            if session.close() {
                info!(%session_id, "shell session closed");
            }
        }
    }

    pub async fn session(&self, session_id: Uuid) -> Option<Arc<ShellSession>> {
        self.sessions.lock().await.get(&session_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn get(&self, session_id: Uuid) -> RegistryResult<Arc<ShellSession>> {
        self.session(session_id)
            .await
            .ok_or(RegistryError::SessionNotFound(session_id))
    }
}

async fn drive_session(
    sessions: Arc<Mutex<HashMap<Uuid, Arc<ShellSession>>>>,
    session: Arc<ShellSession>,
    mut events: ProcessEvents,
) {
    let mut exit_code = None;
    while let Some(event) = events.next().await {
        match event {
            ProcessEvent::Output(chunk) => session.publish(chunk),
            ProcessEvent::Exited(code) => exit_code = code,
            ProcessEvent::SpawnFailed(message) => session.publish(format!("ERROR: {message}\n")),
        }
    }

    if session.close() {
        info!(session_id = %session.id(), ?exit_code, "shell session ended");
    }

    // Closed before `has_had_viewer` is checked, so an attach racing this
    // either sees the session closed and removes it itself, or was counted.
    let mut sessions = sessions.lock().await;
    if session.has_had_viewer() {
        sessions.remove(&session.id());
    }
}
