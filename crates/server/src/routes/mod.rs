//! Route table.

pub mod commands;
pub mod deployments;
pub mod jobs;
pub mod shells;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the full application.
///
/// When `public_dir` is given, unmatched paths are served from it with an
/// `index.html` fallback for client-side routing.
pub fn router(state: AppState, public_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/commands", get(commands::get_commands))
        .route("/api/commands/run", post(commands::run_command))
        .route("/api/commands/run-direct", post(commands::run_direct))
        .route("/api/apps", get(deployments::list_apps))
        .route(
            "/api/deployments",
            get(deployments::list_deployments).post(deployments::deploy_app),
        )
        .route("/api/deployments/:id", get(deployments::get_deployment))
        .route(
            "/api/deployments/:id/address",
            get(deployments::get_address),
        )
        .route(
            "/api/deployments/:id/create",
            post(deployments::create_project),
        )
        .route("/api/deployments/:id/run", post(deployments::run_project))
        .route(
            "/api/deployments/:id/publish",
            post(deployments::publish_project),
        )
        .route("/api/deployments/:id/shell", post(shells::open_shell))
        .route("/api/preferences", get(deployments::get_preferences))
        .route("/api/shells/:id/stream", get(shells::stream_shell))
        .route("/api/shells/:id/input", post(shells::send_input))
        .route("/api/shells/:id/close", post(shells::close_shell))
        .with_state(state);

    let app = match public_dir {
        Some(dir) => {
            let serve_dir = ServeDir::new(dir)
                .append_index_html_on_directories(true)
                .fallback(ServeFile::new(dir.join("index.html")));
            app.fallback_service(serve_dir)
        }
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Parse a path id; anything that is not a UUID cannot name a live entity.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}
