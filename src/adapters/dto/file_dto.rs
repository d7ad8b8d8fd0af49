use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    application::pipeline::Dispatch,
    domain::{
        controls::quantized::ControlKey,
        models::{
            file_record::{
                FileRecord, Outcome, ProcessingErrorKind, ProcessingFailure, ProcessingState,
                RecordId,
            },
            size::{format_file_size, savings_percent},
        },
    },
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorInfo {
    pub kind: ProcessingErrorKind,
    pub message: String,
}

impl From<&ProcessingFailure> for ErrorInfo {
    fn from(failure: &ProcessingFailure) -> Self {
        Self {
            kind: failure.kind,
            message: failure.message.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FileResponse {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "originalSizeBytes")]
    pub original_size_bytes: u64,
    #[serde(rename = "originalSize")]
    pub original_size: String,
    #[serde(rename = "compressionLevel")]
    pub compression_level: u8,
    #[serde(rename = "qualityLabel")]
    pub quality_label: String,
    #[serde(rename = "qualityDescription")]
    pub quality_description: String,
    #[serde(rename = "processingState")]
    pub processing_state: ProcessingState,
    #[serde(rename = "compressedSizeBytes")]
    pub compressed_size_bytes: Option<u64>,
    #[serde(rename = "compressedSize")]
    pub compressed_size: Option<String>,
    #[serde(rename = "savingsPercent")]
    pub savings_percent: Option<f64>,
    #[serde(rename = "lastError")]
    pub last_error: Option<ErrorInfo>,
    /// Result of the previous run while a new one is in flight.
    #[serde(rename = "previousCompressedSizeBytes")]
    pub previous_compressed_size_bytes: Option<u64>,
    #[serde(rename = "previousError")]
    pub previous_error: Option<ErrorInfo>,
    #[serde(rename = "hasPreview")]
    pub has_preview: bool,
    pub selected: bool,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl FileResponse {
    pub fn from_record(record: &FileRecord, selected: Option<RecordId>) -> Self {
        let tier = record.level().tier();
        let completed = record.completed();
        let compressed = completed.map(|result| result.compressed_size_bytes);

        let (previous_compressed_size_bytes, previous_error) = match record.stale_outcome() {
            Some(Outcome::Completed(result)) => (Some(result.compressed_size_bytes), None),
            Some(Outcome::Failed(failure)) => (None, Some(ErrorInfo::from(failure))),
            None => (None, None),
        };

        Self {
            id: record.id(),
            name: record.name().to_string(),
            mime_type: record.mime_type().to_string(),
            original_size_bytes: record.original_size_bytes(),
            original_size: format_file_size(record.original_size_bytes()),
            compression_level: record.level().value(),
            quality_label: tier.label().to_string(),
            quality_description: tier.description().to_string(),
            processing_state: record.state(),
            compressed_size_bytes: compressed,
            compressed_size: compressed.map(format_file_size),
            savings_percent: compressed
                .map(|size| savings_percent(record.original_size_bytes(), size)),
            last_error: record.last_error().map(ErrorInfo::from),
            previous_compressed_size_bytes,
            previous_error,
            has_preview: record.preview().is_some(),
            selected: selected == Some(record.id()),
            added_at: record.added_at(),
            completed_at: completed.map(|result| result.completed_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
}

/// Exactly one of the three inputs must be present.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SetLevelRequest {
    /// Direct level, clamped.
    pub level: Option<i64>,
    /// Pointer position, run through the level control.
    pub raw: Option<f64>,
    /// Keyboard stepping from the record's current level.
    pub key: Option<ControlKey>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetLevelResponse {
    #[serde(rename = "committedLevel")]
    pub committed_level: u8,
    #[serde(rename = "updatedCount")]
    pub updated_count: usize,
    #[serde(rename = "batchMode")]
    pub batch_mode: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub id: RecordId,
    pub started: bool,
    pub generation: Option<u64>,
}

impl ProcessResponse {
    pub fn from_dispatch(id: RecordId, dispatch: &Dispatch) -> Self {
        match dispatch {
            Dispatch::Started { generation, .. } => Self {
                id,
                started: true,
                generation: Some(*generation),
            },
            Dispatch::AlreadyProcessing => Self {
                id,
                started: false,
                generation: None,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessAllResponse {
    pub started: usize,
    #[serde(rename = "alreadyProcessing")]
    pub already_processing: usize,
}
