//! Deployment listing, deployment jobs and project actions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tfd_protocol::deployment_models::{
    AddressResponse, AppsResponse, DeployRequest, DeploymentResponse, DeploymentsResponse,
    PreferencesResponse, ProjectAction, ProjectActionRequest,
};
use tfd_protocol::job_models::StartJobResponse;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::routes::jobs::start_compose_job;
use crate::state::AppState;

/// `GET /api/apps`. Unreadable registry files degrade to an empty list.
pub async fn list_apps(State(state): State<AppState>) -> Json<AppsResponse> {
    let apps = state.store.apps().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load app registry");
        Vec::new()
    });
    Json(AppsResponse { apps })
}

/// `GET /api/deployments`
pub async fn list_deployments(State(state): State<AppState>) -> Json<DeploymentsResponse> {
    let deployments = state.store.deployments().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load deployments");
        Vec::new()
    });
    Json(DeploymentsResponse { deployments })
}

/// `GET /api/deployments/:id`
pub async fn get_deployment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeploymentResponse>> {
    match state.store.deployment(&id)? {
        Some(deployment) => Ok(Json(DeploymentResponse { deployment })),
        None => Err(ApiError::not_found("Deployment not found")),
    }
}

/// `GET /api/deployments/:id/address`
pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AddressResponse>> {
    let output = state.compose.address(&id).await.map_err(|e| {
        warn!(deployment_id = %id, error = %e, "address lookup failed");
        ApiError::internal("Failed to get address", e)
    })?;

    let error = (!output.stderr.is_empty()).then_some(output.stderr);
    Ok(Json(AddressResponse {
        output: output.stdout,
        error,
    }))
}

/// `GET /api/preferences`
pub async fn get_preferences(State(state): State<AppState>) -> Json<PreferencesResponse> {
    let preferences = state.store.preferences().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load preferences");
        PreferencesResponse::default()
    });
    Json(preferences)
}

/// `POST /api/deployments`: start `<compose> up <appName>`.
pub async fn deploy_app(
    State(state): State<AppState>,
    body: Option<Json<DeployRequest>>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    let app_name = body
        .and_then(|Json(request)| request.app_name)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("appName is required"))?;

    let response = start_compose_job(&state, vec!["up".to_string(), app_name.clone()]).await;
    info!(job_id = %response.1.job_id, app = %app_name, "started deployment job");
    Ok(response)
}

/// `POST /api/deployments/:id/create`
pub async fn create_project(
    state: State<AppState>,
    id: Path<String>,
    body: Option<Json<ProjectActionRequest>>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    project_action(state, id, body, ProjectAction::Create).await
}

/// `POST /api/deployments/:id/run`
pub async fn run_project(
    state: State<AppState>,
    id: Path<String>,
    body: Option<Json<ProjectActionRequest>>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    project_action(state, id, body, ProjectAction::Run).await
}

/// `POST /api/deployments/:id/publish`
pub async fn publish_project(
    state: State<AppState>,
    id: Path<String>,
    body: Option<Json<ProjectActionRequest>>,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    project_action(state, id, body, ProjectAction::Publish).await
}

/// Select the deployment, then start the project action as a job.
///
/// The select step is awaited; if it fails no job is created.
async fn project_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<ProjectActionRequest>>,
    action: ProjectAction,
) -> ApiResult<(StatusCode, Json<StartJobResponse>)> {
    let project_name = body
        .and_then(|Json(request)| request.project_name)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("projectName is required"))?;

    if let Err(e) = state.compose.select(&id).await {
        warn!(deployment_id = %id, %action, error = %e, "failed to select deployment");
        return Err(ApiError::internal("Failed to select deployment", e));
    }

    let response = start_compose_job(
        &state,
        vec![action.as_str().to_string(), project_name.clone()],
    )
    .await;
    info!(
        job_id = %response.1.job_id,
        deployment_id = %id,
        project = %project_name,
        %action,
        "started project job"
    );
    Ok(response)
}
