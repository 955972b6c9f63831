//! Job polling endpoints and the shared start helper.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tfd_protocol::job_models::{JobView, JobsResponse, StartJobResponse};
use tracing::info;

use crate::error::ApiResult;
use crate::routes::parse_id;
use crate::state::AppState;

/// Start `<compose_bin> <args...>` as a job and answer `202 Accepted`.
pub(crate) async fn start_compose_job(
    state: &AppState,
    args: Vec<String>,
) -> (StatusCode, Json<StartJobResponse>) {
    let view = state.jobs.create_job(state.compose_bin(), &args).await;
    info!(job_id = %view.id, command = %view.command, "accepted job");
    (StatusCode::ACCEPTED, Json(StartJobResponse::from(&view)))
}

/// `GET /api/jobs/:id`: full snapshot including all output so far.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobView>> {
    let job_id = parse_id(&id, "Job not found")?;
    let view = state.jobs.get_job(job_id).await?;
    Ok(Json(view))
}

/// `GET /api/jobs`
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobsResponse> {
    Json(JobsResponse {
        jobs: state.jobs.list_jobs().await,
    })
}
