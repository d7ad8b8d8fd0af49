use axum::{extract::State, Json};

use crate::{
    adapters::{
        dto::comparison_dto::{ComparisonResponse, DragRequest, InspectRequest},
        state::AppState,
    },
    application::{error::ApplicationError, pipeline::lock_session},
};

pub struct ComparisonController;

impl ComparisonController {
    /// GET /api/v1/comparison
    pub async fn get_comparison(State(app_state): State<AppState>) -> Json<ComparisonResponse> {
        Json(ComparisonResponse::from(&*app_state.comparison()))
    }

    /// PUT /api/v1/comparison/inspect
    pub async fn inspect(
        State(app_state): State<AppState>,
        Json(body): Json<InspectRequest>,
    ) -> Result<Json<ComparisonResponse>, ApplicationError> {
        // session first, then comparison, as everywhere else
        let session = lock_session(&app_state.session);
        if let Some(id) = body.id {
            if session.get(id).is_none() {
                return Err(ApplicationError::NotFound(format!("record {}", id)));
            }
        }

        let mut comparison = app_state.comparison();
        comparison.inspect(body.id);
        Ok(Json(ComparisonResponse::from(&*comparison)))
    }

    /// PUT /api/v1/comparison/drag
    pub async fn drag(
        State(app_state): State<AppState>,
        Json(body): Json<DragRequest>,
    ) -> Json<ComparisonResponse> {
        let mut comparison = app_state.comparison();
        comparison.drag(body.offset_x, body.width);
        Json(ComparisonResponse::from(&*comparison))
    }

    /// POST /api/v1/comparison/reset
    pub async fn reset(State(app_state): State<AppState>) -> Json<ComparisonResponse> {
        let mut comparison = app_state.comparison();
        comparison.reset();
        Json(ComparisonResponse::from(&*comparison))
    }
}
