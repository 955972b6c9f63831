//! Error types for the client crate.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response other than 404.
    #[error("{message} (HTTP {code})")]
    Status { code: u16, message: String },

    #[error("Not found")]
    NotFound,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A start request that did not produce a job.
    #[error("Failed to start {action}: {source}")]
    Start {
        action: String,
        source: Box<ClientError>,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub(crate) fn start(action: impl Into<String>, source: ClientError) -> Self {
        Self::Start {
            action: action.into(),
            source: Box::new(source),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
