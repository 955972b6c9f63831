//! Process runner for jobs and shell sessions.
//!
//! Spawns one external command with a literal argument vector (no shell
//! interpretation) and exposes its output as a stream of raw chunks,
//! stdout and stderr interleaved in arrival order, followed by exactly one
//! exit event.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// Exit code recorded when the program could not be started at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Something observed about a running child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// One read from stdout or stderr, decoded lossily as UTF-8.
    Output(String),

    /// The process exited. `None` when it was terminated by a signal.
    /// Always the last event of a successfully spawned process.
    Exited(Option<i32>),

    /// The process could not be spawned. Always the only event.
    SpawnFailed(String),
}

pub type ProcessEvents = Pin<Box<dyn Stream<Item = ProcessEvent> + Send>>;

/// A spawned child with its event stream and, for interactive use, its stdin.
pub struct RunningProcess {
    pub pid: Option<u32>,
    pub stdin: Option<ChildStdin>,
    pub events: ProcessEvents,
    kill_tx: Option<oneshot::Sender<()>>,
}

impl RunningProcess {
    /// Ask the child to terminate. A no-op once it has already exited or
    /// after a previous call.
    pub fn kill_handle(&mut self) -> Option<KillHandle> {
        self.kill_tx.take().map(KillHandle)
    }
}

/// One-shot handle that terminates a child process.
#[derive(Debug)]
pub struct KillHandle(oneshot::Sender<()>);

impl KillHandle {
    pub fn kill(self) {
        let _ = self.0.send(());
    }
}

/// Spawns external commands in a fixed working directory.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    working_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run a command to completion as a fire-and-forget job.
    ///
    /// Never fails: a spawn error becomes a single
    /// [`ProcessEvent::SpawnFailed`] item. The child's stdin is closed
    /// immediately.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tfd_core::runner::{ProcessEvent, ProcessRunner};
    /// use tokio_stream::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let runner = ProcessRunner::new(".");
    ///     let mut events = runner.execute("echo", &["hello".to_string()]);
    ///     while let Some(event) = events.next().await {
    ///         println!("{event:?}");
    ///     }
    /// }
    /// ```
    pub fn execute(&self, program: &str, args: &[String]) -> ProcessEvents {
        match self.spawn(program, args) {
            Ok(mut process) => {
                process.stdin.take();
                process.events
            }
            Err(e) => {
                let message = format!("Failed to spawn {program}: {e}");
                Box::pin(tokio_stream::once(ProcessEvent::SpawnFailed(message)))
            }
        }
    }

    /// Spawn a command with stdin kept open, for interactive sessions.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, program: &str, args: &[String]) -> std::io::Result<RunningProcess> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.current_dir(&self.working_dir);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        let pid = child.id();
        debug!(program, ?args, pid, "spawned child process");

        let stdin = child.stdin.take();

        // Both pipes feed one channel so chunks keep their arrival order.
        let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            pump(stdout, chunk_tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            pump(stderr, chunk_tx.clone());
        }
        drop(chunk_tx);

        let (kill_tx, kill_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = oneshot::channel();
        tokio::spawn(wait_for_exit(child, kill_rx, exit_tx));

        let events = async_stream::stream! {
            while let Some(chunk) = chunk_rx.recv().await {
                yield ProcessEvent::Output(chunk);
            }
            let code = exit_rx.await.unwrap_or(None);
            yield ProcessEvent::Exited(code);
        };

        Ok(RunningProcess {
            pid,
            stdin,
            events: Box::pin(events),
            kill_tx: Some(kill_tx),
        })
    }
}

fn pump<R>(mut reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let mut pending = Vec::new();
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let chunk = decode_utf8(&mut pending, &buf[..n]);
                    if !chunk.is_empty() && tx.send(chunk).is_err() {
                        return;
                    }
                }
            }
        }
        if !pending.is_empty() {
            let _ = tx.send(String::from_utf8_lossy(&pending).into_owned());
        }
    });
}

/// Decode `bytes` after whatever `pending` held, leaving an incomplete
/// trailing sequence in `pending` for the next read. Invalid bytes become
/// U+FFFD.
fn decode_utf8(pending: &mut Vec<u8>, bytes: &[u8]) -> String {
    pending.extend_from_slice(bytes);
    let mut text = String::with_capacity(pending.len());
    let mut start = 0;
    while start < pending.len() {
        match std::str::from_utf8(&pending[start..]) {
            Ok(valid) => {
                text.push_str(valid);
                start = pending.len();
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&pending[start..valid_end]));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }
    pending.drain(..start);
    text
}

async fn wait_for_exit(
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    exit_tx: oneshot::Sender<Option<i32>>,
) {
    // A dropped kill sender disables the second branch rather than killing.
    let waited = tokio::select! {
        status = child.wait() => Some(status),
        Ok(()) = kill_rx => None,
    };

    let status = match waited {
        Some(status) => status,
        None => {
            if let Err(e) = child.kill().await {
                debug!(error = %e, "kill failed, child probably already exited");
            }
            child.wait().await
        }
    };

    let code = status.ok().and_then(|s| s.code());
    let _ = exit_tx.send(code);
}

/// Collect every event of a stream, mostly useful in tests.
pub async fn collect_events(mut events: ProcessEvents) -> Vec<ProcessEvent> {
    let mut out = Vec::new();
    while let Some(event) = events.next().await {
        out.push(event);
    }
    out
}
