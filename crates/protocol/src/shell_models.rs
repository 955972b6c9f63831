//! Interactive shell session models.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Name of the SSE event that signals the end of a shell stream.
pub const SHELL_CLOSE_EVENT: &str = "close";

/// One message delivered to a shell viewer.
///
/// On the wire each `Line` is an unnamed SSE message whose data is the
/// line text; `Close` is a `close` event and is always the last message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ShellMessage {
    /// A line (or line fragment) of subprocess output, without its newline.
    Line(String),

    /// The session has closed; no further messages follow.
    Close,
}

/// Response body of `POST /api/deployments/:id/shell`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct OpenShellResponse {
    #[ts(type = "string")]
    pub session_id: Uuid,
}

/// Request body of `POST /api/shells/:id/input`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ShellInputRequest {
    pub data: String,
}

/// Generic acknowledgement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
