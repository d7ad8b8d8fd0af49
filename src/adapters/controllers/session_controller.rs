use axum::{extract::State, Json};
use tracing::info;

use crate::{
    adapters::{
        dto::session_dto::{AggregatesResponse, ExportResponse, SessionResponse, ToggleRequest},
        state::AppState,
    },
    application::pipeline::lock_session,
};

pub struct SessionController;

impl SessionController {
    /// GET /api/v1/session
    pub async fn get_session(State(app_state): State<AppState>) -> Json<SessionResponse> {
        let session = lock_session(&app_state.session);
        Json(SessionResponse::from(&*session))
    }

    /// PUT /api/v1/session/batch
    pub async fn set_batch_mode(
        State(app_state): State<AppState>,
        Json(body): Json<ToggleRequest>,
    ) -> Json<SessionResponse> {
        let mut session = lock_session(&app_state.session);
        session.set_batch_mode(body.enabled);
        info!("Batch mode {}", if body.enabled { "enabled" } else { "disabled" });
        Json(SessionResponse::from(&*session))
    }

    /// PUT /api/v1/session/lossless
    pub async fn set_lossless(
        State(app_state): State<AppState>,
        Json(body): Json<ToggleRequest>,
    ) -> Json<SessionResponse> {
        let mut session = lock_session(&app_state.session);
        session.set_lossless(body.enabled);
        info!("Lossless mode {}", if body.enabled { "enabled" } else { "disabled" });
        Json(SessionResponse::from(&*session))
    }

    /// GET /api/v1/session/aggregates
    pub async fn get_aggregates(State(app_state): State<AppState>) -> Json<AggregatesResponse> {
        let aggregates = lock_session(&app_state.session).derive_aggregates();
        Json(aggregates.into())
    }

    /// GET /api/v1/session/export
    pub async fn export_manifest(State(app_state): State<AppState>) -> Json<ExportResponse> {
        let manifest = lock_session(&app_state.session).export_manifest();
        info!("Exporting {} completed file(s)", manifest.len());
        Json(ExportResponse {
            count: manifest.len(),
            files: manifest.into_iter().map(Into::into).collect(),
        })
    }
}
