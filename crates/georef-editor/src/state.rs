//! The shape under edit and its per-gesture scratch fields.

use georef_core::{HandleType, Point, Shape};

/// Mutable record of one editor's shape.
///
/// `drag_start` and `snapshot` live for exactly one gesture: they are set on
/// pointer-down and cleared on pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformState {
    pub shape: Option<Shape>,
    pub active_handle: HandleType,
    pub drag_start: Option<Point>,
    pub snapshot: Option<Shape>,
    pub is_creating: bool,
    pub is_editing: bool,
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gesture currently owns the pointer.
    pub fn is_locked(&self) -> bool {
        self.is_creating || self.is_editing
    }

    /// Start an edit gesture on the existing shape. Returns `false` (and
    /// changes nothing) when there is no shape to edit.
    pub fn begin_edit(&mut self, at: Point, handle: HandleType) -> bool {
        let Some(shape) = self.shape else {
            return false;
        };
        self.snapshot = Some(shape);
        self.drag_start = Some(at);
        self.active_handle = handle;
        self.is_editing = true;
        true
    }

    /// The pair every edit drag needs; `None` outside a gesture.
    pub fn gesture_base(&self) -> Option<(Shape, Point)> {
        if !self.is_editing {
            return None;
        }
        Some((self.snapshot?, self.drag_start?))
    }

    /// Clear the gesture scratch. Returns whether an edit was in progress.
    pub fn end_edit(&mut self) -> bool {
        let was_editing = self.is_editing && self.snapshot.is_some();
        self.clear_gesture();
        was_editing
    }

    pub fn clear_gesture(&mut self) {
        self.snapshot = None;
        self.drag_start = None;
        self.active_handle = HandleType::None;
        self.is_creating = false;
        self.is_editing = false;
    }

    /// Back to the empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::ClipRect;
    use pretty_assertions::assert_eq;

    #[test]
    fn begin_edit_requires_shape() {
        let mut state = TransformState::new();
        assert!(!state.begin_edit(Point::ZERO, HandleType::Body));
        assert_eq!(state, TransformState::default());
    }

    #[test]
    fn gesture_scratch_cleared_on_end() {
        let mut state = TransformState::new();
        state.shape = Some(Shape::Rect(ClipRect::new(Point::ZERO, 10.0, 10.0)));
        assert!(state.begin_edit(Point::new(5.0, 5.0), HandleType::Body));
        assert!(state.is_locked());
        assert!(state.gesture_base().is_some());

        assert!(state.end_edit());
        assert_eq!(state.snapshot, None);
        assert_eq!(state.drag_start, None);
        assert_eq!(state.active_handle, HandleType::None);
        assert!(!state.is_locked());
        assert!(!state.end_edit());
        assert!(state.shape.is_some());
    }
}
