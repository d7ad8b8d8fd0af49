use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    application::services::{BackendReport, ProcessingBackend, ProcessingRequest},
    services::error::BackendError,
};

/// Percent of the file a level of 100 removes.
const MAX_REDUCTION_PERCENT: u128 = 80;
/// Lossless output keeps more of the file.
const LOSSLESS_MAX_REDUCTION_PERCENT: u128 = 40;
/// Output never drops below a tenth of the original.
const MIN_DIVISOR: u64 = 10;

/// Fabricates a size reduction from the requested level after a fixed delay.
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn estimate(request: &ProcessingRequest) -> u64 {
        let original = u128::from(request.original_size_bytes);
        let max_reduction = if request.lossless {
            LOSSLESS_MAX_REDUCTION_PERCENT
        } else {
            MAX_REDUCTION_PERCENT
        };
        let level = u128::from(request.level.value());

        // original * (1 - level/100 * reduction/100), floored
        let compressed = original * (10_000 - level * max_reduction) / 10_000;
        let floor = request.original_size_bytes / MIN_DIVISOR;
        (compressed as u64).max(floor).max(1)
    }
}

#[async_trait]
impl ProcessingBackend for SimulatedBackend {
    async fn process(&self, request: ProcessingRequest) -> Result<BackendReport, BackendError> {
        tokio::time::sleep(self.delay).await;

        let compressed = Self::estimate(&request);
        debug!(
            "Simulated {} -> {} bytes at level {}",
            request.original_size_bytes,
            compressed,
            request.level.value()
        );

        Ok(BackendReport {
            compressed_size_bytes: i64::try_from(compressed).unwrap_or(i64::MAX),
        })
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::level::CompressionLevel;

    fn request(size: u64, level: i64, lossless: bool) -> ProcessingRequest {
        ProcessingRequest {
            original_size_bytes: size,
            level: CompressionLevel::clamped(level),
            lossless,
        }
    }

    #[test]
    fn test_estimate_follows_level() {
        assert_eq!(SimulatedBackend::estimate(&request(1_000_000, 0, false)), 1_000_000);
        assert_eq!(SimulatedBackend::estimate(&request(1_000_000, 50, false)), 600_000);
        assert_eq!(SimulatedBackend::estimate(&request(1_000_000, 70, false)), 440_000);
        assert_eq!(SimulatedBackend::estimate(&request(1_000_000, 100, false)), 200_000);
    }

    #[test]
    fn test_lossless_reduces_less() {
        assert_eq!(SimulatedBackend::estimate(&request(1_000_000, 100, true)), 600_000);
    }

    #[test]
    fn test_tiny_files_stay_positive() {
        assert_eq!(SimulatedBackend::estimate(&request(1, 100, false)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_waits_for_delay() {
        let backend = SimulatedBackend::new(Duration::from_millis(2000));
        let started = tokio::time::Instant::now();
        let report = backend.process(request(1_000, 50, false)).await.unwrap();
        assert_eq!(report.compressed_size_bytes, 600);
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }
}
