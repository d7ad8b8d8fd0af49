use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{level::CompressionLevel, preview::PreviewHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One accepted file as handed over by the acquisition layer.
#[derive(Debug)]
pub struct NewFileEntry {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub preview: Option<PreviewHandle>,
}

impl NewFileEntry {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: PreviewHandle) -> Self {
        self.preview = Some(preview);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingState {
    Idle,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingErrorKind {
    BackendError,
    InvalidResult,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingFailure {
    pub kind: ProcessingErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionResult {
    pub compressed_size_bytes: u64,
    pub level: CompressionLevel,
    pub lossless: bool,
    pub completed_at: DateTime<Utc>,
}

/// Last settled result of a backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(CompressionResult),
    Failed(ProcessingFailure),
}

/// Parameters of one backend call, tagged with the record generation that
/// issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingTicket {
    pub id: RecordId,
    pub generation: u64,
    pub original_size_bytes: u64,
    pub level: CompressionLevel,
    pub lossless: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    generation: u64,
    level: CompressionLevel,
    lossless: bool,
}

#[derive(Debug)]
pub struct FileRecord {
    id: RecordId,
    name: String,
    mime_type: String,
    original_size_bytes: u64,
    added_at: DateTime<Utc>,
    preview: Option<PreviewHandle>,
    level: CompressionLevel,
    generation: u64,
    in_flight: Option<InFlight>,
    outcome: Option<Outcome>,
}

impl FileRecord {
    pub fn new(entry: NewFileEntry) -> Self {
        Self {
            id: RecordId::new(),
            name: entry.name,
            mime_type: entry.mime_type,
            original_size_bytes: entry.size_bytes,
            added_at: Utc::now(),
            preview: entry.preview,
            level: CompressionLevel::default(),
            generation: 0,
            in_flight: None,
            outcome: None,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn original_size_bytes(&self) -> u64 {
        self.original_size_bytes
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> ProcessingState {
        if self.in_flight.is_some() {
            return ProcessingState::Processing;
        }
        match self.outcome {
            None => ProcessingState::Idle,
            Some(Outcome::Completed(_)) => ProcessingState::Completed,
            Some(Outcome::Failed(_)) => ProcessingState::Failed,
        }
    }

    /// Present only while `Completed`.
    pub fn compressed_size_bytes(&self) -> Option<u64> {
        self.completed().map(|result| result.compressed_size_bytes)
    }

    pub fn completed(&self) -> Option<&CompressionResult> {
        match (&self.in_flight, &self.outcome) {
            (None, Some(Outcome::Completed(result))) => Some(result),
            _ => None,
        }
    }

    /// Last completed result, kept while a newer request is in flight.
    pub fn best_known_result(&self) -> Option<&CompressionResult> {
        match &self.outcome {
            Some(Outcome::Completed(result)) => Some(result),
            _ => None,
        }
    }

    /// Present only while `Failed`.
    pub fn last_error(&self) -> Option<&ProcessingFailure> {
        match (&self.in_flight, &self.outcome) {
            (None, Some(Outcome::Failed(failure))) => Some(failure),
            _ => None,
        }
    }

    /// The previous outcome while a new request is in flight.
    pub fn stale_outcome(&self) -> Option<&Outcome> {
        self.in_flight.and(self.outcome.as_ref())
    }

    pub(crate) fn set_level(&mut self, level: CompressionLevel) {
        self.level = level;
    }

    /// Enters `Processing`. Returns `None` when an identical request is
    /// already in flight; otherwise bumps the generation so that any older
    /// in-flight result is discarded on arrival.
    pub(crate) fn begin_processing(&mut self, lossless: bool) -> Option<ProcessingTicket> {
        if let Some(in_flight) = self.in_flight {
            if in_flight.level == self.level && in_flight.lossless == lossless {
                return None;
            }
        }

        self.generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            level: self.level,
            lossless,
        });

        Some(ProcessingTicket {
            id: self.id,
            generation: self.generation,
            original_size_bytes: self.original_size_bytes,
            level: self.level,
            lossless,
        })
    }

    /// Applies an outcome if it belongs to the current generation.
    pub(crate) fn settle(&mut self, generation: u64, outcome: Outcome) -> bool {
        match self.in_flight {
            Some(in_flight) if in_flight.generation == generation => {
                self.in_flight = None;
                self.outcome = Some(outcome);
                true
            }
            _ => false,
        }
    }
}
