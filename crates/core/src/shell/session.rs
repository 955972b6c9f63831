//! A single interactive shell session.
//!
//! All viewer bookkeeping happens under one lock: appending a chunk to the
//! replay buffer and pushing it to viewers is atomic with respect to
//! attaching a viewer, so a new viewer sees every chunk exactly once,
//! either in its replay or live.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tfd_protocol::shell_models::ShellMessage;
use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::runner::KillHandle;
use crate::shell::lines::split_lines;

#[derive(Default)]
struct SessionState {
    /// Raw output chunks, in arrival order.
    buffer: Vec<String>,
    viewers: HashMap<u64, mpsc::UnboundedSender<ShellMessage>>,
    next_viewer_id: u64,
    closed: bool,
}

/// One subprocess connected to a remote target.
pub struct ShellSession {
    id: Uuid,
    target: String,
    state: Mutex<SessionState>,
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
    kill: Mutex<Option<KillHandle>>,
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ShellSession {
    pub(crate) fn new(target: &str, stdin: Option<ChildStdin>, kill: Option<KillHandle>) -> Self {
        Self {
            id: Uuid::new_v4(),
            target: target.to_string(),
            state: Mutex::new(SessionState::default()),
            stdin: tokio::sync::Mutex::new(stdin),
            kill: Mutex::new(kill),
        }
    }

    /// A session whose subprocess never started: already closed, with the
    /// error as its only output.
    pub(crate) fn failed(target: &str, message: &str) -> Self {
        let session = Self::new(target, None, None);
        {
            let mut state = session.lock_state();
            state.buffer.push(format!("ERROR: {message}\n"));
            state.closed = true;
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    pub fn viewer_count(&self) -> usize {
        self.lock_state().viewers.len()
    }

    /// Whether any viewer was ever attached, including ones since dropped.
    pub(crate) fn has_had_viewer(&self) -> bool {
        self.lock_state().next_viewer_id > 0
    }

    /// Concatenated replay buffer.
    pub fn output(&self) -> String {
        self.lock_state().buffer.concat()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Buffer a chunk and push its lines to every attached viewer.
    ///
    /// Viewers whose receiving side is gone are dropped. Ignored once closed.
    pub(crate) fn publish(&self, chunk: String) {
        let mut state = self.lock_state();
        if state.closed {
            return;
        }
        let lines = split_lines(&chunk);
        state.viewers.retain(|_, tx| {
            lines
                .iter()
                .all(|line| tx.send(ShellMessage::Line(line.clone())).is_ok())
        });
        state.buffer.push(chunk);
    }

    /// Attach a viewer: replay the whole buffer, then follow live output.
    ///
    /// Attaching to a closed session replays the buffer followed by
    /// [`ShellMessage::Close`].
    pub(crate) fn attach(self: &Arc<Self>) -> Viewer {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock_state();

        for chunk in &state.buffer {
            for line in split_lines(chunk) {
                let _ = tx.send(ShellMessage::Line(line));
            }
        }

        let viewer_id = state.next_viewer_id;
        state.next_viewer_id += 1;

        if state.closed {
            let _ = tx.send(ShellMessage::Close);
        } else {
            state.viewers.insert(viewer_id, tx);
        }

        Viewer {
            id: viewer_id,
            session: Arc::downgrade(self),
            rx,
        }
    }

    pub(crate) fn detach(&self, viewer_id: u64) -> bool {
        self.lock_state().viewers.remove(&viewer_id).is_some()
    }

    /// Close the session: notify and detach all viewers, terminate the child.
    ///
    /// Idempotent. Returns `true` only for the call that actually closed it.
    pub(crate) fn close(&self) -> bool {
        let viewers = {
            let mut state = self.lock_state();
            if state.closed {
                return false;
            }
            state.closed = true;
            std::mem::take(&mut state.viewers)
        };

        for tx in viewers.values() {
            let _ = tx.send(ShellMessage::Close);
        }

        let kill = self
            .kill
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(kill) = kill {
            kill.kill();
        }
        true
    }

    /// Write raw text to the subprocess's stdin.
    pub(crate) async fn write_input(&self, text: &str) -> RegistryResult<()> {
        if self.is_closed() {
            return Err(RegistryError::SessionClosed(self.id));
        }
        let mut stdin = self.stdin.lock().await;
        let Some(stdin) = stdin.as_mut() else {
            return Err(RegistryError::SessionClosed(self.id));
        };
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|source| RegistryError::Input {
                id: self.id,
                source,
            })?;
        stdin.flush().await.map_err(|source| RegistryError::Input {
            id: self.id,
            source,
        })
    }
}

/// A live subscription to one session's output.
///
/// Dropping the viewer detaches it.
#[derive(Debug)]
pub struct Viewer {
    id: u64,
    session: Weak<ShellSession>,
    rx: mpsc::UnboundedReceiver<ShellMessage>,
}

impl Viewer {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next message, or `None` after [`ShellMessage::Close`] has been received.
    pub async fn recv(&mut self) -> Option<ShellMessage> {
        self.rx.recv().await
    }

    /// Next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<ShellMessage> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        if let Some(session) = self.session.upgrade() {
            session.detach(self.id);
        }
    }
}
