//! Short, awaited invocations of the compose CLI.
//!
//! Long-running operations go through the job registry; this wrapper is for
//! the quick commands whose result a request handler needs before replying.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};

/// Captured output of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct ComposeCli {
    program: String,
    working_dir: PathBuf,
}

impl ComposeCli {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// `<compose> select <deployment>`: make a deployment the active one.
    pub async fn select(&self, deployment_id: &str) -> ComposeResult<ComposeOutput> {
        self.run(&["select", deployment_id]).await
    }

    /// `<compose> address <deployment>`: print its addresses and URLs.
    pub async fn address(&self, deployment_id: &str) -> ComposeResult<ComposeOutput> {
        self.run(&["address", deployment_id]).await
    }

    /// Run to completion. A non-zero exit is an error carrying stderr.
    pub async fn run(&self, args: &[&str]) -> ComposeResult<ComposeOutput> {
        let command_line = std::iter::once(self.program.as_str())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command_line, "running compose command");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ComposeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| format!("code {c}"));
            return Err(ComposeError::Failed {
                command: command_line,
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(ComposeOutput { stdout, stderr })
    }
}
