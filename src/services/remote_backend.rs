use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::{
    application::services::{BackendReport, ProcessingBackend, ProcessingRequest},
    services::error::BackendError,
};

/// Delegates to an external codec service over HTTP.
///
/// `POST {base_url}/compress` with `{"originalSizeBytes", "level", "lossless"}`,
/// answered by `{"compressedSizeBytes"}`.
pub struct RemoteBackend {
    client: Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: &str, request_timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProcessingBackend for RemoteBackend {
    async fn process(&self, request: ProcessingRequest) -> Result<BackendReport, BackendError> {
        let url = format!("{}/compress", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(BackendError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Codec service answered {}: {}", status, error_text);
            return Err(BackendError::Rejected(format!(
                "status {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json::<BackendReport>()
            .await
            .map_err(|e| BackendError::Unavailable(format!("Malformed codec response: {}", e)))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
