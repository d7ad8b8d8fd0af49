use axum::extract::FromRef;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    application::{
        pipeline::{ProcessingPipeline, SharedSession},
        session_store::SessionStore,
    },
    domain::{
        config::service::{ConfigError, ServiceConfig},
        controls::{comparison::ComparisonView, quantized::QuantizedControl},
        models::preview::PreviewCache,
    },
    services,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub session: SharedSession,
    pub pipeline: ProcessingPipeline,
    pub previews: Arc<PreviewCache>,
    pub comparison: Arc<Mutex<ComparisonView>>,
    pub level_control: Arc<QuantizedControl>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        let backend = services::create_processing_backend(&config)?;
        let session: SharedSession = Arc::new(Mutex::new(SessionStore::new()));
        let pipeline =
            ProcessingPipeline::new(Arc::clone(&session), backend, config.processing_timeout);

        Ok(Self {
            level_control: Arc::new(config.level_control()),
            config: Arc::new(config),
            session,
            pipeline,
            previews: PreviewCache::new(),
            comparison: Arc::new(Mutex::new(ComparisonView::new())),
        })
    }

    pub fn comparison(&self) -> MutexGuard<'_, ComparisonView> {
        self.comparison
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
