//! Error types for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::net::SocketAddr;
use tfd_core::{ComposeError, RegistryError, StoreError};
use tfd_protocol::deployment_models::ErrorResponse;
use thiserror::Error;
use tracing::warn;

/// A failed request, rendered as `{"error": ..., "details": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{error}")]
    Internal {
        error: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(error: impl Into<String>, details: impl ToString) -> Self {
        Self::Internal {
            error: error.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::NotFound(error) | Self::BadRequest(error) => ErrorResponse {
                error,
                details: None,
            },
            Self::Internal { error, details } => ErrorResponse { error, details },
        };
        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::JobNotFound(_) => Self::not_found("Job not found"),
            RegistryError::SessionNotFound(_) | RegistryError::SessionClosed(_) => {
                Self::not_found("Shell session not found")
            }
            RegistryError::Input { .. } => {
                warn!(error = %err, "shell input failed");
                Self::internal("Failed to send shell input", err)
            }
        }
    }
}

impl From<ComposeError> for ApiError {
    fn from(err: ComposeError) -> Self {
        Self::internal("Compose command failed", err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::internal("Failed to read compose state", err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that stop the server from starting.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid listen address {host}:{port}: {reason}")]
    InvalidAddress {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("No free port in {first}..={last}")]
    PortsExhausted { first: u16, last: u16 },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}
