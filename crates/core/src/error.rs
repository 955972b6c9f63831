//! Error types for the job and shell registries and the compose CLI wrapper.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by [`JobRegistry`](crate::jobs::JobRegistry) and
/// [`ShellRegistry`](crate::shell::ShellRegistry).
///
/// Process failures never appear here; they are recorded on the job or
/// session itself.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Shell session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Shell session {0} is closed")]
    SessionClosed(Uuid),

    #[error("Failed to write to shell session {id}: {source}")]
    Input {
        id: Uuid,
        source: std::io::Error,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors from short, awaited compose CLI invocations (`select`, `address`).
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{command} exited with {code}: {stderr}")]
    Failed {
        command: String,
        code: String,
        stderr: String,
    },
}

pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors reading the compose CLI's state files and command schema.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML file at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON file at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
