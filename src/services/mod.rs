mod error;
mod remote_backend;
mod simulated_backend;

pub use error::BackendError;
pub use remote_backend::RemoteBackend;
pub use simulated_backend::SimulatedBackend;

use std::sync::Arc;

use crate::{
    application::services::ProcessingBackend,
    domain::config::service::{BackendKind, ConfigError, ServiceConfig},
};

pub fn create_processing_backend(
    config: &ServiceConfig,
) -> Result<Arc<dyn ProcessingBackend>, ConfigError> {
    match config.backend {
        BackendKind::Simulated => Ok(Arc::new(SimulatedBackend::new(config.simulated_delay))),
        BackendKind::Remote => {
            let base_url = config
                .remote_backend_url
                .as_deref()
                .ok_or(ConfigError::Missing("REMOTE_BACKEND_URL"))?;

            let service = RemoteBackend::new(base_url, config.processing_timeout).map_err(|e| {
                ConfigError::InvalidValue {
                    name: "REMOTE_BACKEND_URL",
                    value: e.to_string(),
                }
            })?;
            Ok(Arc::new(service))
        }
    }
}
