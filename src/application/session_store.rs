use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    application::error::SessionError,
    domain::models::{
        file_record::{FileRecord, NewFileEntry, Outcome, ProcessingState, ProcessingTicket, RecordId},
        level::CompressionLevel,
        size::savings_percent,
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub total_original: u64,
    pub total_compressed: u64,
    pub savings_percent: f64,
    pub processed_count: usize,
}

/// A completed record ready for the download sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportEntry {
    pub id: RecordId,
    pub name: String,
    pub mime_type: String,
    pub original_size_bytes: u64,
    pub compressed_size_bytes: u64,
    pub completed_at: DateTime<Utc>,
}

/// What happened to a settled backend result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    Stale,
    RecordRemoved,
}

/// Sole owner of the session: records in display order, the selection
/// cursor and the editing flags.
#[derive(Debug, Default)]
pub struct SessionStore {
    records: Vec<FileRecord>,
    selected: Option<RecordId>,
    batch_mode: bool,
    batch_level: CompressionLevel,
    lossless: bool,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&FileRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&FileRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn batch_mode(&self) -> bool {
        self.batch_mode
    }

    /// Level last applied in batch mode. Starts at the default level.
    pub fn batch_level(&self) -> CompressionLevel {
        self.batch_level
    }

    pub fn lossless(&self) -> bool {
        self.lossless
    }

    /// Appends one idle record per entry, in order. Selects the first new
    /// record when nothing is selected yet.
    pub fn add_files(&mut self, entries: impl IntoIterator<Item = NewFileEntry>) -> Vec<RecordId> {
        let ids: Vec<RecordId> = entries
            .into_iter()
            .map(|entry| {
                let record = FileRecord::new(entry);
                let id = record.id();
                debug!(
                    "Added record {} ({}, {} bytes)",
                    id,
                    record.name(),
                    record.original_size_bytes()
                );
                self.records.push(record);
                id
            })
            .collect();

        if self.selected.is_none() {
            self.selected = ids.first().copied();
        }

        info!("Added {} file(s), session holds {}", ids.len(), self.records.len());
        ids
    }

    /// Destroys the record and its preview. Absent ids are a no-op.
    pub fn remove_file(&mut self, id: RecordId) -> bool {
        let Some(index) = self.position(id) else {
            debug!("Ignoring removal of unknown record {}", id);
            return false;
        };

        let removed = self.records.remove(index);

        if self.selected == Some(id) {
            self.selected = self
                .records
                .get(index)
                .or_else(|| self.records.last())
                .map(FileRecord::id);
        }

        info!("Removed record {} ({})", id, removed.name());
        // preview released here
        drop(removed);
        true
    }

    /// Batch mode applies to every record and ignores `id`. Otherwise only
    /// the selected record can be changed. Returns how many records changed.
    pub fn set_level(&mut self, id: RecordId, level: i64) -> usize {
        let level = CompressionLevel::clamped(level);

        if self.batch_mode {
            self.batch_level = level;
            for record in &mut self.records {
                record.set_level(level);
            }
            debug!("Batch level set to {} on {} record(s)", level.value(), self.records.len());
            return self.records.len();
        }

        if self.selected != Some(id) {
            debug!("Ignoring level change for unselected record {}", id);
            return 0;
        }

        match self.records.iter_mut().find(|record| record.id() == id) {
            Some(record) => {
                record.set_level(level);
                debug!("Level of {} set to {}", id, level.value());
                1
            }
            None => 0,
        }
    }

    pub fn select_file(&mut self, id: RecordId) -> Result<(), SessionError> {
        if self.position(id).is_none() {
            return Err(SessionError::UnknownRecord(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn set_batch_mode(&mut self, enabled: bool) {
        self.batch_mode = enabled;
    }

    pub fn set_lossless(&mut self, enabled: bool) {
        self.lossless = enabled;
    }

    /// Current best-known totals. A record being reprocessed keeps counting
    /// its last completed size; records never completed count at their
    /// original size.
    pub fn derive_aggregates(&self) -> Aggregates {
        let mut total_original = 0u64;
        let mut total_compressed = 0u64;
        let mut processed_count = 0usize;

        for record in &self.records {
            total_original += record.original_size_bytes();
            match record.best_known_result() {
                Some(result) => {
                    total_compressed += result.compressed_size_bytes;
                    processed_count += 1;
                }
                None => total_compressed += record.original_size_bytes(),
            }
        }

        Aggregates {
            total_original,
            total_compressed,
            savings_percent: savings_percent(total_original, total_compressed),
            processed_count,
        }
    }

    pub fn export_manifest(&self) -> Vec<ExportEntry> {
        self.records
            .iter()
            .filter_map(|record| {
                record.best_known_result().map(|result| ExportEntry {
                    id: record.id(),
                    name: record.name().to_string(),
                    mime_type: record.mime_type().to_string(),
                    original_size_bytes: record.original_size_bytes(),
                    compressed_size_bytes: result.compressed_size_bytes,
                    completed_at: result.completed_at,
                })
            })
            .collect()
    }

    /// Drops every record, releasing all previews.
    pub fn clear(&mut self) {
        self.records.clear();
        self.selected = None;
    }

    pub(crate) fn begin_processing(
        &mut self,
        id: RecordId,
    ) -> Result<Option<ProcessingTicket>, SessionError> {
        let lossless = self.lossless;
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or(SessionError::UnknownRecord(id))?;
        Ok(record.begin_processing(lossless))
    }

    pub(crate) fn settle(&mut self, id: RecordId, generation: u64, outcome: Outcome) -> Settlement {
        let Some(record) = self.records.iter_mut().find(|record| record.id() == id) else {
            return Settlement::RecordRemoved;
        };

        if record.settle(generation, outcome) {
            Settlement::Applied
        } else {
            Settlement::Stale
        }
    }

    pub fn processing_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.state() == ProcessingState::Processing)
            .count()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }
}
