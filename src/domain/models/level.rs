use serde::{Deserialize, Serialize};

/// Compression level in `[0, 100]`. Higher means smaller output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    /// Clamps any integer input into range. Never fails.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn tier(self) -> QualityTier {
        QualityTier::for_level(self)
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(50)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityTier {
    HighestQuality,
    HighQuality,
    Balanced,
    HighCompression,
    MaximumCompression,
}

impl QualityTier {
    pub fn for_level(level: CompressionLevel) -> Self {
        match level.value() {
            0..=20 => QualityTier::HighestQuality,
            21..=40 => QualityTier::HighQuality,
            41..=60 => QualityTier::Balanced,
            61..=80 => QualityTier::HighCompression,
            _ => QualityTier::MaximumCompression,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::HighestQuality => "Highest Quality",
            QualityTier::HighQuality => "High Quality",
            QualityTier::Balanced => "Balanced",
            QualityTier::HighCompression => "High Compression",
            QualityTier::MaximumCompression => "Maximum Compression",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            QualityTier::HighestQuality => "Minimal compression, largest files",
            QualityTier::HighQuality => "Light compression, good balance",
            QualityTier::Balanced => "Moderate compression, decent quality",
            QualityTier::HighCompression => "Strong compression, smaller files",
            QualityTier::MaximumCompression => "Highest compression, smallest files",
        }
    }
}
