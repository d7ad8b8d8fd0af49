use crate::domain::models::file_record::RecordId;

pub const INITIAL_POSITION: f64 = 50.0;

/// Reveal cursor of the before/after inspector. View-local state; never
/// written back to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    inspected: Option<RecordId>,
    position: f64,
}

impl Default for ComparisonView {
    fn default() -> Self {
        Self {
            inspected: None,
            position: INITIAL_POSITION,
        }
    }
}

impl ComparisonView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inspected(&self) -> Option<RecordId> {
        self.inspected
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Switching to a different record resets the cursor.
    pub fn inspect(&mut self, id: Option<RecordId>) {
        if self.inspected != id {
            self.inspected = id;
            self.position = INITIAL_POSITION;
        }
    }

    /// Pointer drag at `offset_x` within an inspector `width` wide.
    /// Degenerate widths leave the cursor where it is.
    pub fn drag(&mut self, offset_x: f64, width: f64) -> f64 {
        if width.is_finite() && width > 0.0 && offset_x.is_finite() {
            self.position = (offset_x / width * 100.0).clamp(0.0, 100.0);
        }
        self.position
    }

    pub fn reset(&mut self) {
        self.position = INITIAL_POSITION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_clamps_to_bounds() {
        let mut view = ComparisonView::new();
        assert_eq!(view.drag(150.0, 600.0), 25.0);
        assert_eq!(view.drag(-40.0, 600.0), 0.0);
        assert_eq!(view.drag(900.0, 600.0), 100.0);
        assert_eq!(view.drag(10.0, 0.0), 100.0);
    }

    #[test]
    fn test_changing_record_resets_position() {
        let first = RecordId::new();
        let mut view = ComparisonView::new();
        view.inspect(Some(first));
        view.drag(90.0, 100.0);

        view.inspect(Some(first));
        assert_eq!(view.position(), 90.0);

        view.inspect(Some(RecordId::new()));
        assert_eq!(view.position(), INITIAL_POSITION);
    }
}
