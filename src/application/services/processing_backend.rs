use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{domain::models::level::CompressionLevel, services::BackendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessingRequest {
    #[serde(rename = "originalSizeBytes")]
    pub original_size_bytes: u64,
    pub level: CompressionLevel,
    pub lossless: bool,
}

/// Raw backend answer. Signed so that nonsensical sizes reach the pipeline
/// and are rejected there instead of being lost in a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendReport {
    #[serde(rename = "compressedSizeBytes")]
    pub compressed_size_bytes: i64,
}

/// Performs the size reduction for one file. Each call resolves at most once.
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    async fn process(&self, request: ProcessingRequest) -> Result<BackendReport, BackendError>;

    fn name(&self) -> &'static str;
}
