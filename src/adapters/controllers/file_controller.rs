use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use tracing::{info, warn};

use crate::{
    adapters::{
        acquisition,
        dto::file_dto::{
            FileListResponse, FileResponse, ProcessAllResponse, ProcessResponse, SetLevelRequest,
            SetLevelResponse,
        },
        state::AppState,
    },
    application::{error::ApplicationError, pipeline::lock_session},
    domain::models::{file_record::RecordId, level::CompressionLevel},
};

pub struct FileController;

impl FileController {
    /// GET /api/v1/files
    pub async fn list_files(State(app_state): State<AppState>) -> Json<FileListResponse> {
        let session = lock_session(&app_state.session);
        let selected = session.selected_id();
        let files = session
            .records()
            .iter()
            .map(|record| FileResponse::from_record(record, selected))
            .collect();
        Json(FileListResponse { files })
    }

    /// POST /api/v1/files
    /// Multipart with one or more `file` parts. All parts are admitted or
    /// none is.
    pub async fn upload_files(
        State(app_state): State<AppState>,
        mut multipart: Multipart,
    ) -> Result<(StatusCode, Json<FileListResponse>), ApplicationError> {
        let uploads = acquisition::read_uploads(&mut multipart).await?;

        for upload in &uploads {
            acquisition::admit(&app_state.config, upload).inspect_err(|e| {
                warn!("Rejected upload '{}': {}", upload.name, e);
            })?;
        }

        let entries: Vec<_> = uploads
            .into_iter()
            .map(|upload| acquisition::into_entry(upload, &app_state.previews))
            .collect();

        let mut session = lock_session(&app_state.session);
        let ids = session.add_files(entries);
        let selected = session.selected_id();
        let files = ids
            .iter()
            .filter_map(|id| session.get(*id))
            .map(|record| FileResponse::from_record(record, selected))
            .collect();

        let mut comparison = app_state.comparison();
        if comparison.inspected().is_none() {
            comparison.inspect(selected);
        }

        info!("Accepted {} upload(s)", ids.len());
        Ok((StatusCode::CREATED, Json(FileListResponse { files })))
    }

    /// GET /api/v1/files/{id}
    pub async fn get_file(
        State(app_state): State<AppState>,
        Path(id): Path<RecordId>,
    ) -> Result<Json<FileResponse>, ApplicationError> {
        let session = lock_session(&app_state.session);
        let record = session
            .get(id)
            .ok_or_else(|| ApplicationError::NotFound(format!("record {}", id)))?;
        Ok(Json(FileResponse::from_record(record, session.selected_id())))
    }

    /// DELETE /api/v1/files/{id}
    /// Removing an unknown id is not an error. An inspector showing the
    /// removed record moves to the new selection.
    pub async fn delete_file(
        State(app_state): State<AppState>,
        Path(id): Path<RecordId>,
    ) -> StatusCode {
        let mut session = lock_session(&app_state.session);
        let was_selected = session.selected_id() == Some(id);

        if session.remove_file(id) {
            let mut comparison = app_state.comparison();
            if was_selected || comparison.inspected() == Some(id) {
                comparison.inspect(session.selected_id());
            }
        }

        StatusCode::NO_CONTENT
    }

    /// GET /api/v1/files/{id}/preview
    pub async fn get_preview(
        State(app_state): State<AppState>,
        Path(id): Path<RecordId>,
    ) -> Result<Response, ApplicationError> {
        let preview = {
            let session = lock_session(&app_state.session);
            let record = session
                .get(id)
                .ok_or_else(|| ApplicationError::NotFound(format!("record {}", id)))?;
            record
                .preview()
                .and_then(|handle| handle.load())
                .ok_or_else(|| ApplicationError::NotFound(format!("preview of {}", id)))?
        };

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, preview.mime_type)
            .header(header::CONTENT_LENGTH, preview.content.len())
            .body(Body::from(preview.content))
            .map_err(|e| ApplicationError::InternalError(e.to_string()))
    }

    /// POST /api/v1/files/{id}/select
    pub async fn select_file(
        State(app_state): State<AppState>,
        Path(id): Path<RecordId>,
    ) -> Result<Json<FileResponse>, ApplicationError> {
        let mut session = lock_session(&app_state.session);
        session.select_file(id)?;
        let record = session
            .get(id)
            .ok_or_else(|| ApplicationError::NotFound(format!("record {}", id)))?;
        let response = FileResponse::from_record(record, Some(id));

        app_state.comparison().inspect(Some(id));
        Ok(Json(response))
    }

    /// PUT /api/v1/files/{id}/level
    pub async fn set_level(
        State(app_state): State<AppState>,
        Path(id): Path<RecordId>,
        Json(body): Json<SetLevelRequest>,
    ) -> Result<Json<SetLevelResponse>, ApplicationError> {
        let control = &app_state.level_control;
        let mut session = lock_session(&app_state.session);
        let mut updated_count = 0;

        let committed = match (body.level, body.raw, body.key) {
            (Some(level), None, None) => {
                updated_count = session.set_level(id, level);
                level
            }
            (None, Some(raw), None) => {
                control.set_value(raw, |level| updated_count = session.set_level(id, level))
            }
            (None, None, Some(key)) => {
                let current = session
                    .get(id)
                    .or_else(|| session.selected())
                    .map(|record| record.level())
                    .unwrap_or_default();
                control.handle_key(i64::from(current.value()), key, |level| {
                    updated_count = session.set_level(id, level)
                })
            }
            _ => {
                return Err(ApplicationError::BadRequest(
                    "Exactly one of 'level', 'raw' or 'key' is required".to_string(),
                ))
            }
        };

        Ok(Json(SetLevelResponse {
            committed_level: CompressionLevel::clamped(committed).value(),
            updated_count,
            batch_mode: session.batch_mode(),
        }))
    }

    /// POST /api/v1/files/{id}/process
    pub async fn process_file(
        State(app_state): State<AppState>,
        Path(id): Path<RecordId>,
    ) -> Result<(StatusCode, Json<ProcessResponse>), ApplicationError> {
        let dispatch = app_state.pipeline.process(id)?;
        Ok((
            StatusCode::ACCEPTED,
            Json(ProcessResponse::from_dispatch(id, &dispatch)),
        ))
    }

    /// POST /api/v1/files/process
    pub async fn process_all(
        State(app_state): State<AppState>,
    ) -> (StatusCode, Json<ProcessAllResponse>) {
        let summary = app_state.pipeline.process_all();
        (
            StatusCode::ACCEPTED,
            Json(ProcessAllResponse {
                started: summary.started,
                already_processing: summary.already_processing,
            }),
        )
    }
}
