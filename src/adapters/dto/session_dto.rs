use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    application::session_store::{Aggregates, ExportEntry, SessionStore},
    domain::models::{file_record::RecordId, size::format_file_size},
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AggregatesResponse {
    #[serde(rename = "totalOriginal")]
    pub total_original: u64,
    #[serde(rename = "totalCompressed")]
    pub total_compressed: u64,
    #[serde(rename = "totalOriginalSize")]
    pub total_original_size: String,
    #[serde(rename = "totalCompressedSize")]
    pub total_compressed_size: String,
    #[serde(rename = "savingsPercent")]
    pub savings_percent: f64,
    #[serde(rename = "processedCount")]
    pub processed_count: usize,
}

impl From<Aggregates> for AggregatesResponse {
    fn from(aggregates: Aggregates) -> Self {
        Self {
            total_original: aggregates.total_original,
            total_compressed: aggregates.total_compressed,
            total_original_size: format_file_size(aggregates.total_original),
            total_compressed_size: format_file_size(aggregates.total_compressed),
            savings_percent: aggregates.savings_percent,
            processed_count: aggregates.processed_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "fileCount")]
    pub file_count: usize,
    #[serde(rename = "selectedId")]
    pub selected_id: Option<RecordId>,
    #[serde(rename = "batchMode")]
    pub batch_mode: bool,
    pub lossless: bool,
    #[serde(rename = "processingCount")]
    pub processing_count: usize,
    /// Level shown by the selector: the batch level in batch mode, else the
    /// selected record's.
    #[serde(rename = "currentLevel")]
    pub current_level: Option<u8>,
    #[serde(rename = "qualityLabel")]
    pub quality_label: Option<String>,
    pub aggregates: AggregatesResponse,
}

impl From<&SessionStore> for SessionResponse {
    fn from(session: &SessionStore) -> Self {
        let current_level = if session.batch_mode() {
            Some(session.batch_level())
        } else {
            session.selected().map(|record| record.level())
        };

        Self {
            file_count: session.len(),
            selected_id: session.selected_id(),
            batch_mode: session.batch_mode(),
            lossless: session.lossless(),
            processing_count: session.processing_count(),
            current_level: current_level.map(|level| level.value()),
            quality_label: current_level.map(|level| level.tier().label().to_string()),
            aggregates: session.derive_aggregates().into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportEntryResponse {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "originalSizeBytes")]
    pub original_size_bytes: u64,
    #[serde(rename = "compressedSizeBytes")]
    pub compressed_size_bytes: u64,
    #[serde(rename = "completedAt")]
    pub completed_at: DateTime<Utc>,
}

impl From<ExportEntry> for ExportEntryResponse {
    fn from(entry: ExportEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            mime_type: entry.mime_type,
            original_size_bytes: entry.original_size_bytes,
            compressed_size_bytes: entry.compressed_size_bytes,
            completed_at: entry.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub count: usize,
    pub files: Vec<ExportEntryResponse>,
}
