use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::adapters::{
    controllers::{
        comparison_controller::ComparisonController, file_controller::FileController,
        health_controller::HealthController, session_controller::SessionController,
    },
    state::AppState,
};

/// Multipart framing on top of the per-file limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;
/// Upper bound on files accepted per request body.
const MAX_FILES_PER_REQUEST: usize = 8;

async fn hello_world() -> &'static str {
    "Hello, world!"
}

pub fn build_router(app_state: AppState) -> Router {
    let cors = match &app_state.config.cors_allowed_origins {
        Some(allowed_origins) => {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        // Allow all origins if not specified (only for development)
        None => CorsLayer::permissive(),
    };

    let body_limit = usize::try_from(app_state.config.max_size)
        .unwrap_or(usize::MAX)
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(hello_world))
        .route("/api/v1/health", get(HealthController::health_check))
        .route(
            "/api/v1/files",
            get(FileController::list_files).post(FileController::upload_files),
        )
        .route("/api/v1/files/process", post(FileController::process_all))
        .route(
            "/api/v1/files/{id}",
            get(FileController::get_file).delete(FileController::delete_file),
        )
        .route("/api/v1/files/{id}/preview", get(FileController::get_preview))
        .route("/api/v1/files/{id}/select", post(FileController::select_file))
        .route("/api/v1/files/{id}/level", put(FileController::set_level))
        .route("/api/v1/files/{id}/process", post(FileController::process_file))
        .route("/api/v1/session", get(SessionController::get_session))
        .route("/api/v1/session/batch", put(SessionController::set_batch_mode))
        .route("/api/v1/session/lossless", put(SessionController::set_lossless))
        .route(
            "/api/v1/session/aggregates",
            get(SessionController::get_aggregates),
        )
        .route("/api/v1/session/export", get(SessionController::export_manifest))
        .route("/api/v1/comparison", get(ComparisonController::get_comparison))
        .route("/api/v1/comparison/inspect", put(ComparisonController::inspect))
        .route("/api/v1/comparison/drag", put(ComparisonController::drag))
        .route("/api/v1/comparison/reset", post(ComparisonController::reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(app_state)
}
