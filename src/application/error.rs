use thiserror::Error;

use crate::domain::models::file_record::RecordId;

/// Structural errors raised by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Unknown record: {0}")]
    UnknownRecord(RecordId),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<SessionError> for ApplicationError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::UnknownRecord(id) => ApplicationError::NotFound(format!("record {}", id)),
        }
    }
}
