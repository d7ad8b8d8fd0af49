use serde::{Deserialize, Serialize};

/// Step applied by PageUp/PageDown, independent of the configured step.
pub const PAGE_STEP: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKey {
    ArrowLeft,
    ArrowRight,
    ArrowDown,
    ArrowUp,
    PageUp,
    PageDown,
}

/// Maps raw pointer or keyboard input to a committed integer in `[min, max]`.
///
/// The control keeps no value of its own; the caller owns the current value
/// and receives every commit through `on_change`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedControl {
    min: i64,
    max: i64,
    step: i64,
    snap_points: Vec<i64>,
    snap_threshold: f64,
}

impl QuantizedControl {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
            step: 1,
            snap_points: Vec::new(),
            snap_threshold: 5.0,
        }
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step.max(1);
        self
    }

    /// Snap points are scanned in the given order; the first one in range wins.
    pub fn with_snap_points(mut self, snap_points: Vec<i64>, snap_threshold: f64) -> Self {
        self.snap_points = snap_points;
        self.snap_threshold = snap_threshold.max(0.0);
        self
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn snap_points(&self) -> &[i64] {
        &self.snap_points
    }

    pub fn snap_threshold(&self) -> f64 {
        self.snap_threshold
    }

    /// Pointer input: snaps, else clamps.
    pub fn set_value(&self, raw: f64, on_change: impl FnOnce(i64)) -> i64 {
        let committed = self.quantize(raw);
        on_change(committed);
        committed
    }

    /// Keyboard input: steps from `current` without snapping.
    pub fn handle_key(&self, current: i64, key: ControlKey, on_change: impl FnOnce(i64)) -> i64 {
        let committed = self.stepped(current, key);
        on_change(committed);
        committed
    }

    pub fn quantize(&self, raw: f64) -> i64 {
        let snapped = self
            .snap_points
            .iter()
            .find(|&&point| (raw - point as f64).abs() <= self.snap_threshold);

        match snapped {
            Some(&point) => point,
            None if raw.is_nan() => self.min,
            None => (raw.round().clamp(self.min as f64, self.max as f64)) as i64,
        }
    }

    pub fn stepped(&self, current: i64, key: ControlKey) -> i64 {
        let delta = match key {
            ControlKey::ArrowLeft | ControlKey::ArrowDown => -self.step,
            ControlKey::ArrowRight | ControlKey::ArrowUp => self.step,
            ControlKey::PageDown => -PAGE_STEP,
            ControlKey::PageUp => PAGE_STEP,
        };
        current.saturating_add(delta).clamp(self.min, self.max)
    }
}
