use thiserror::Error;

use crate::domain::models::file_record::ProcessingErrorKind;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Backend rejected request: {0}")]
    Rejected(String),

    #[error("Backend timed out: {0}")]
    Timeout(String),
}

impl BackendError {
    pub fn kind(&self) -> ProcessingErrorKind {
        match self {
            BackendError::Timeout(_) => ProcessingErrorKind::Timeout,
            BackendError::Unavailable(_)
            | BackendError::NetworkError(_)
            | BackendError::Rejected(_) => ProcessingErrorKind::BackendError,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            BackendError::Timeout(error.to_string())
        } else if error.is_connect() {
            BackendError::NetworkError(format!("Connection failed: {}", error))
        } else if let Some(status) = error.status() {
            BackendError::Rejected(format!("status {}: {}", status.as_u16(), error))
        } else {
            BackendError::Unavailable(error.to_string())
        }
    }
}
