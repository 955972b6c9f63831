//! Shell session endpoints.
//!
//! Output is streamed as Server-Sent Events: each line is an unnamed
//! message, and a `close` event ends the stream. The viewer is attached
//! before the response is returned, so nothing emitted after the request
//! arrives can be missed.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use std::convert::Infallible;
use tfd_protocol::shell_models::{
    AckResponse, OpenShellResponse, ShellInputRequest, ShellMessage, SHELL_CLOSE_EVENT,
};
use tokio_stream::Stream;
use tracing::debug;

use crate::error::ApiResult;
use crate::routes::parse_id;
use crate::state::AppState;

const SESSION_NOT_FOUND: &str = "Shell session not found";

/// `POST /api/deployments/:id/shell`
pub async fn open_shell(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Json<OpenShellResponse> {
    let session_id = state.shells.open_session(&target).await;
    Json(OpenShellResponse { session_id })
}

/// `GET /api/shells/:id/stream`
pub async fn stream_shell(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let session_id = parse_id(&id, SESSION_NOT_FOUND)?;
    let mut viewer = state.shells.attach(session_id).await?;
    debug!(%session_id, viewer = viewer.id(), "viewer attached");

    let events = async_stream::stream! {
        while let Some(message) = viewer.recv().await {
            match message {
                ShellMessage::Line(line) => {
                    yield Ok(Event::default().data(sse_safe(&line)));
                }
                ShellMessage::Close => {
                    yield Ok(Event::default().event(SHELL_CLOSE_EVENT).data(""));
                    break;
                }
            }
        }
        debug!(%session_id, viewer = viewer.id(), "viewer detached");
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// `POST /api/shells/:id/input`
pub async fn send_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ShellInputRequest>,
) -> ApiResult<Json<AckResponse>> {
    let session_id = parse_id(&id, SESSION_NOT_FOUND)?;
    state.shells.send_input(session_id, &request.data).await?;
    Ok(Json(AckResponse::ok()))
}

/// `POST /api/shells/:id/close`: always acknowledged.
pub async fn close_shell(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<AckResponse> {
    if let Ok(session_id) = uuid::Uuid::parse_str(&id) {
        state.shells.close(session_id).await;
    }
    Json(AckResponse::ok())
}

/// SSE fields cannot carry carriage returns.
fn sse_safe(line: &str) -> String {
    line.replace('\r', "")
}
