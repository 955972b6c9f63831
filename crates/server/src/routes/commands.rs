//! Command schema and schema-driven job starts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tfd_core::commands::{build_cli_args, tokenize_direct_line};
use tfd_protocol::command_models::{CommandRequest, CommandsSchema, DirectRunRequest};
use tfd_protocol::job_models::StartJobResponse;

use crate::error::{ApiError, ApiResult};
use crate::routes::jobs::start_compose_job;
use crate::state::AppState;

/// `GET /api/commands`
pub async fn get_commands(State(state): State<AppState>) -> Json<CommandsSchema> {
    Json(state.catalog.schema().clone())
}

/// `POST /api/commands/run`
pub async fn run_command(
    State(state): State<AppState>,
    body: Option<Json<CommandRequest>>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    let Some(Json(request)) = body else {
        return Err(ApiError::bad_request("commandId is required"));
    };
    let command_id = request.command_id.trim();
    if command_id.is_empty() {
        return Err(ApiError::bad_request("commandId is required"));
    }

    let Some(def) = state.catalog.find(command_id) else {
        return Err(ApiError::not_found(format!("Unknown command: {command_id}")));
    };
    let args = build_cli_args(def, &request);

    Ok(start_compose_job(&state, args).await)
}

/// `POST /api/commands/run-direct`: whitespace-split, no shell semantics.
pub async fn run_direct(
    State(state): State<AppState>,
    body: Option<Json<DirectRunRequest>>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    let line = body.map(|Json(request)| request.line).unwrap_or_default();
    let args = tokenize_direct_line(&line);
    if args.is_empty() {
        return Err(ApiError::bad_request("line is required"));
    }

    Ok(start_compose_job(&state, args).await)
}
