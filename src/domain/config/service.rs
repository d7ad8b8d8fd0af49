use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::controls::quantized::QuantizedControl;

pub const DEFAULT_MIME_TYPES: [&str; 7] = [
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Missing required variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum BackendKind {
    #[serde(rename = "simulated")]
    Simulated,
    #[serde(rename = "remote")]
    Remote,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub mime_types: Vec<String>,
    pub max_size: u64,
    pub backend: BackendKind,
    pub simulated_delay: Duration,
    pub processing_timeout: Option<Duration>,
    pub remote_backend_url: Option<String>,
    pub level_step: i64,
    pub level_snap_points: Vec<i64>,
    pub level_snap_threshold: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: None,
            mime_types: DEFAULT_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
            max_size: 50 * 1024 * 1024,
            backend: BackendKind::Simulated,
            simulated_delay: Duration::from_millis(2000),
            processing_timeout: None,
            remote_backend_url: None,
            level_step: 1,
            level_snap_points: Vec::new(),
            level_snap_threshold: 5.0,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = parse("PORT", &port)?;
        }

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = Some(split_list(&origins));
        }

        if let Some(mime_types) = lookup("ALLOWED_MIME_TYPES") {
            let mime_types = split_list(&mime_types);
            if mime_types.is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: "ALLOWED_MIME_TYPES",
                    value: String::new(),
                });
            }
            config.mime_types = mime_types;
        }

        if let Some(max_size) = lookup("MAX_UPLOAD_BYTES") {
            config.max_size = parse("MAX_UPLOAD_BYTES", &max_size)?;
        }

        if let Some(backend) = lookup("PROCESSING_BACKEND") {
            config.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "simulated" => BackendKind::Simulated,
                "remote" => BackendKind::Remote,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "PROCESSING_BACKEND",
                        value: backend,
                    })
                }
            };
        }

        if let Some(delay) = lookup("PROCESSING_DELAY_MS") {
            config.simulated_delay = Duration::from_millis(parse("PROCESSING_DELAY_MS", &delay)?);
        }

        if let Some(timeout) = lookup("PROCESSING_TIMEOUT_MS") {
            let millis: u64 = parse("PROCESSING_TIMEOUT_MS", &timeout)?;
            // 0 disables the timeout
            config.processing_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }

        config.remote_backend_url = lookup("REMOTE_BACKEND_URL");
        if config.backend == BackendKind::Remote && config.remote_backend_url.is_none() {
            return Err(ConfigError::Missing("REMOTE_BACKEND_URL"));
        }

        if let Some(step) = lookup("LEVEL_STEP") {
            config.level_step = parse("LEVEL_STEP", &step)?;
            if config.level_step < 1 {
                return Err(ConfigError::InvalidValue {
                    name: "LEVEL_STEP",
                    value: step,
                });
            }
        }

        if let Some(points) = lookup("LEVEL_SNAP_POINTS") {
            config.level_snap_points = split_list(&points)
                .iter()
                .map(|point| parse("LEVEL_SNAP_POINTS", point))
                .collect::<Result<_, _>>()?;
        }

        if let Some(threshold) = lookup("LEVEL_SNAP_THRESHOLD") {
            config.level_snap_threshold = parse("LEVEL_SNAP_THRESHOLD", &threshold)?;
        }

        Ok(config)
    }

    /// The control used by the level selector.
    pub fn level_control(&self) -> QuantizedControl {
        QuantizedControl::new(0, 100)
            .with_step(self.level_step)
            .with_snap_points(self.level_snap_points.clone(), self.level_snap_threshold)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
