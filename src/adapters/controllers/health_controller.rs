use axum::{extract::State, Json};
use serde::Serialize;
use sysinfo::System;
use tracing::info;

use crate::{adapters::state::AppState, application::pipeline::lock_session};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub config: HealthConfigInfo,
    pub session: SessionInfo,
    pub metrics: SystemMetrics,
}

#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    #[serde(rename = "cpuUsagePercent")]
    pub cpu_usage_percent: f32,
    #[serde(rename = "memoryUsedBytes")]
    pub memory_used_bytes: u64,
    #[serde(rename = "memoryTotalBytes")]
    pub memory_total_bytes: u64,
    #[serde(rename = "memoryUsagePercent")]
    pub memory_usage_percent: f32,
}

#[derive(Debug, Serialize)]
pub struct HealthConfigInfo {
    #[serde(rename = "maxSize")]
    pub max_size: u64,
    #[serde(rename = "allowedMimeTypes")]
    pub allowed_mime_types: Vec<String>,
    #[serde(rename = "processingTimeoutMs")]
    pub processing_timeout_ms: Option<u128>,
    #[serde(rename = "levelStep")]
    pub level_step: i64,
    #[serde(rename = "levelSnapPoints")]
    pub level_snap_points: Vec<i64>,
    #[serde(rename = "levelSnapThreshold")]
    pub level_snap_threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    #[serde(rename = "fileCount")]
    pub file_count: usize,
    #[serde(rename = "processingCount")]
    pub processing_count: usize,
    #[serde(rename = "cachedPreviews")]
    pub cached_previews: usize,
}

pub struct HealthController;

impl HealthController {
    /// GET /api/v1/health
    pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
        info!("Health check requested");

        let config_info = {
            let config = &app_state.config;
            let control = &app_state.level_control;
            HealthConfigInfo {
                max_size: config.max_size,
                allowed_mime_types: config.mime_types.clone(),
                processing_timeout_ms: config.processing_timeout.map(|t| t.as_millis()),
                level_step: control.step(),
                level_snap_points: control.snap_points().to_vec(),
                level_snap_threshold: control.snap_threshold(),
            }
        };

        let session_info = {
            let session = lock_session(&app_state.session);
            SessionInfo {
                file_count: session.len(),
                processing_count: session.processing_count(),
                cached_previews: app_state.previews.len(),
            }
        };

        // Collect system metrics (only refresh what's needed)
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let memory_used = sys.used_memory();
        let memory_total = sys.total_memory();
        let memory_usage_percent = if memory_total > 0 {
            (memory_used as f32 / memory_total as f32) * 100.0
        } else {
            0.0
        };

        let metrics = SystemMetrics {
            cpu_usage_percent: sys.global_cpu_usage(),
            memory_used_bytes: memory_used,
            memory_total_bytes: memory_total,
            memory_usage_percent,
        };

        Json(HealthResponse {
            status: "healthy".to_string(),
            backend: app_state.pipeline.backend_name().to_string(),
            config: config_info,
            session: session_info,
            metrics,
        })
    }
}
