use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    application::{
        error::SessionError,
        services::{BackendReport, ProcessingBackend, ProcessingRequest},
        session_store::{SessionStore, Settlement},
    },
    domain::models::file_record::{
        CompressionResult, Outcome, ProcessingErrorKind, ProcessingFailure, ProcessingTicket,
        RecordId,
    },
    services::BackendError,
};

pub type SharedSession = Arc<Mutex<SessionStore>>;

pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, SessionStore> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub enum Dispatch {
    /// A backend call was issued; the task resolves once its result is settled.
    Started {
        generation: u64,
        task: JoinHandle<Settlement>,
    },
    /// An identical request is already in flight.
    AlreadyProcessing,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessAllSummary {
    pub started: usize,
    pub already_processing: usize,
}

/// Drives backend calls for records and settles their results back into
/// the session. Results are always applied from a spawned task, never
/// inside `process`.
#[derive(Clone)]
pub struct ProcessingPipeline {
    session: SharedSession,
    backend: Arc<dyn ProcessingBackend>,
    timeout: Option<Duration>,
}

impl ProcessingPipeline {
    pub fn new(
        session: SharedSession,
        backend: Arc<dyn ProcessingBackend>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            session,
            backend,
            timeout,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Must be called from within a tokio runtime.
    pub fn process(&self, id: RecordId) -> Result<Dispatch, SessionError> {
        let ticket = lock_session(&self.session).begin_processing(id)?;

        let Some(ticket) = ticket else {
            debug!("Record {} already processing with the same parameters", id);
            return Ok(Dispatch::AlreadyProcessing);
        };

        info!(
            "Processing record {} (generation {}, level {}, lossless {})",
            id,
            ticket.generation,
            ticket.level.value(),
            ticket.lossless
        );

        let generation = ticket.generation;
        let pipeline = self.clone();
        let task = tokio::spawn(async move {
            let outcome = pipeline.run(&ticket).await;
            pipeline.apply(&ticket, outcome)
        });

        Ok(Dispatch::Started { generation, task })
    }

    /// Issues an independent request for every record.
    pub fn process_all(&self) -> ProcessAllSummary {
        let ids: Vec<RecordId> = lock_session(&self.session)
            .records()
            .iter()
            .map(|record| record.id())
            .collect();

        let mut summary = ProcessAllSummary::default();
        for id in ids {
            match self.process(id) {
                Ok(Dispatch::Started { .. }) => summary.started += 1,
                Ok(Dispatch::AlreadyProcessing) => summary.already_processing += 1,
                // removed between listing and dispatch
                Err(SessionError::UnknownRecord(_)) => {}
            }
        }

        info!(
            "Process-all issued {} request(s), {} already in flight",
            summary.started, summary.already_processing
        );
        summary
    }

    async fn run(&self, ticket: &ProcessingTicket) -> Outcome {
        let request = ProcessingRequest {
            original_size_bytes: ticket.original_size_bytes,
            level: ticket.level,
            lossless: ticket.lossless,
        };

        let call = self.backend.process(request);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout(format!("no answer within {:?}", limit))),
            },
            None => call.await,
        };

        match result {
            Ok(report) => validate(ticket, report),
            Err(error) => Outcome::Failed(ProcessingFailure {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }

    fn apply(&self, ticket: &ProcessingTicket, outcome: Outcome) -> Settlement {
        let summary = match &outcome {
            Outcome::Completed(result) => format!("completed at {} bytes", result.compressed_size_bytes),
            Outcome::Failed(failure) => format!("failed ({:?}): {}", failure.kind, failure.message),
        };

        let settlement = lock_session(&self.session).settle(ticket.id, ticket.generation, outcome);
        match settlement {
            Settlement::Applied => info!("Record {} {}", ticket.id, summary),
            Settlement::Stale => debug!(
                "Discarded stale result for record {} (generation {})",
                ticket.id, ticket.generation
            ),
            Settlement::RecordRemoved => {
                debug!("Discarded result for removed record {}", ticket.id)
            }
        }
        settlement
    }
}

/// Accepts only `0 < compressed <= original`.
fn validate(ticket: &ProcessingTicket, report: BackendReport) -> Outcome {
    let compressed = report.compressed_size_bytes;
    if compressed <= 0 || compressed as u64 > ticket.original_size_bytes {
        warn!(
            "Backend reported {} bytes for record {} of {} bytes",
            compressed, ticket.id, ticket.original_size_bytes
        );
        return Outcome::Failed(ProcessingFailure {
            kind: ProcessingErrorKind::InvalidResult,
            message: format!(
                "compressed size {} outside (0, {}]",
                compressed, ticket.original_size_bytes
            ),
        });
    }

    Outcome::Completed(CompressionResult {
        compressed_size_bytes: compressed as u64,
        level: ticket.level,
        lossless: ticket.lossless,
        completed_at: Utc::now(),
    })
}
