//! Two-slot tool selection.
//!
//! The *candidate* tool tracks whatever is under the pointer on every move.
//! The *active* tool receives gestures and only follows the candidate while
//! no gesture is locked, so a fast pointer cannot switch tools mid-drag.

use crate::tools::ToolKind;
use georef_core::hit::{detect_handle, is_in_rotate_zone};
use georef_core::{ClipRect, HandleType, Point, Shape};

/// Everything the hit test needs about the current frame, in world space.
#[derive(Debug, Clone, Copy)]
pub struct HitContext {
    pub shape: Option<Shape>,
    pub pointer: Point,
    /// Grab radius already converted to world units.
    pub radius: f64,
    /// Rotate ring outer edge, as a multiple of `radius`.
    pub rotate_zone: f64,
    /// When set, creation is only offered inside these bounds. An existing
    /// shape stays grabbable wherever it is.
    pub limit: Option<ClipRect>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolManager {
    active: ToolKind,
    candidate: ToolKind,
    /// Pan mode (Space held): no tool is ever activated.
    pan_mode: bool,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ToolKind {
        self.active
    }

    pub fn candidate(&self) -> ToolKind {
        self.candidate
    }

    pub fn pan_mode(&self) -> bool {
        self.pan_mode
    }

    /// Handle under the pointer, without touching either slot.
    pub fn detect_handle(&self, ctx: &HitContext) -> HandleType {
        match &ctx.shape {
            Some(shape) => detect_handle(ctx.pointer, shape, ctx.radius),
            None => HandleType::None,
        }
    }

    /// The tool the pointer position calls for.
    pub fn evaluate(&self, ctx: &HitContext) -> ToolKind {
        let Some(shape) = &ctx.shape else {
            return match ctx.limit {
                Some(limit) if !limit.contains(ctx.pointer) => ToolKind::None,
                _ => ToolKind::Create,
            };
        };
        match self.detect_handle(ctx) {
            HandleType::Body => ToolKind::Move,
            HandleType::None => match shape {
                Shape::Quad(q) if is_in_rotate_zone(ctx.pointer, q, ctx.radius, ctx.rotate_zone) => {
                    ToolKind::Rotate
                }
                _ => ToolKind::None,
            },
            handle => ToolKind::Resize(handle),
        }
    }

    /// Re-evaluate the candidate; promote it to active unless `locked`.
    pub fn update(&mut self, ctx: &HitContext, locked: bool) {
        self.candidate = if self.pan_mode {
            ToolKind::None
        } else {
            self.evaluate(ctx)
        };
        if !locked && self.active != self.candidate {
            log::debug!("tool: {:?} -> {:?}", self.active, self.candidate);
            self.active = self.candidate;
        }
    }

    /// Entering pan mode drops the active tool, unless a gesture is
    /// `locked`: that gesture keeps its tool until the pointer is released.
    pub fn set_pan_mode(&mut self, on: bool, locked: bool) {
        self.pan_mode = on;
        if on {
            self.candidate = ToolKind::None;
            if !locked {
                self.active = ToolKind::None;
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            pan_mode: self.pan_mode,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georef_core::{HIT_RADIUS, Quad};
    use pretty_assertions::assert_eq;

    fn ctx(shape: Option<Shape>, x: f64, y: f64) -> HitContext {
        HitContext {
            shape,
            pointer: Point::new(x, y),
            radius: HIT_RADIUS,
            rotate_zone: 2.5,
            limit: None,
        }
    }

    #[test]
    fn no_shape_means_create() {
        let mut tm = ToolManager::new();
        tm.update(&ctx(None, 5.0, 5.0), false);
        assert_eq!(tm.active(), ToolKind::Create);
    }

    #[test]
    fn handles_map_to_tools() {
        let shape = Shape::Rect(ClipRect::new(Point::ZERO, 100.0, 100.0));
        let tm = ToolManager::new();
        assert_eq!(
            tm.evaluate(&ctx(Some(shape), 99.0, 1.0)),
            ToolKind::Resize(HandleType::TopRight)
        );
        assert_eq!(
            tm.evaluate(&ctx(Some(shape), 50.0, 100.0)),
            ToolKind::Resize(HandleType::Bottom)
        );
        assert_eq!(tm.evaluate(&ctx(Some(shape), 40.0, 60.0)), ToolKind::Move);
        assert_eq!(tm.evaluate(&ctx(Some(shape), 300.0, 60.0)), ToolKind::None);
        // Rects have no rotate ring.
        assert_eq!(tm.evaluate(&ctx(Some(shape), 115.0, 115.0)), ToolKind::None);
    }

    #[test]
    fn quad_rotate_ring() {
        let shape = Shape::Quad(Quad::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
        ));
        let tm = ToolManager::new();
        assert_eq!(tm.evaluate(&ctx(Some(shape), 115.0, 115.0)), ToolKind::Rotate);
    }

    #[test]
    fn locked_gesture_keeps_active_tool() {
        let shape = Shape::Rect(ClipRect::new(Point::ZERO, 100.0, 100.0));
        let mut tm = ToolManager::new();
        tm.update(&ctx(Some(shape), 50.0, 50.0), false);
        assert_eq!(tm.active(), ToolKind::Move);

        // Mid-drag the pointer crosses a corner.
        tm.update(&ctx(Some(shape), 0.0, 0.0), true);
        assert_eq!(tm.active(), ToolKind::Move);
        assert_eq!(tm.candidate(), ToolKind::Resize(HandleType::TopLeft));

        tm.update(&ctx(Some(shape), 0.0, 0.0), false);
        assert_eq!(tm.active(), ToolKind::Resize(HandleType::TopLeft));
    }

    #[test]
    fn limit_blocks_tools_outside() {
        let mut c = ctx(None, 250.0, 10.0);
        c.limit = Some(ClipRect::new(Point::ZERO, 200.0, 100.0));
        let tm = ToolManager::new();
        assert_eq!(tm.evaluate(&c), ToolKind::None);
        c.pointer = Point::new(150.0, 10.0);
        assert_eq!(tm.evaluate(&c), ToolKind::Create);
    }

    #[test]
    fn limit_does_not_hide_an_existing_shape() {
        let shape = Shape::Rect(ClipRect::new(Point::new(400.0, 300.0), 100.0, 100.0));
        let mut c = ctx(Some(shape), 450.0, 350.0);
        c.limit = Some(ClipRect::new(Point::ZERO, 300.0, 200.0));
        let tm = ToolManager::new();
        assert_eq!(tm.evaluate(&c), ToolKind::Move);
        c.pointer = Point::new(500.0, 400.0);
        assert_eq!(tm.evaluate(&c), ToolKind::Resize(HandleType::BottomRight));
        c.pointer = Point::new(150.0, 100.0);
        assert_eq!(tm.evaluate(&c), ToolKind::None);
    }

    #[test]
    fn pan_mode_waits_for_locked_gesture() {
        let shape = Shape::Rect(ClipRect::new(Point::ZERO, 100.0, 100.0));
        let mut tm = ToolManager::new();
        tm.update(&ctx(Some(shape), 50.0, 50.0), false);
        tm.set_pan_mode(true, true);
        assert_eq!(tm.active(), ToolKind::Move);
        assert_eq!(tm.candidate(), ToolKind::None);

        tm.update(&ctx(Some(shape), 60.0, 60.0), true);
        assert_eq!(tm.active(), ToolKind::Move);
        // Released: pan mode takes over.
        tm.update(&ctx(Some(shape), 60.0, 60.0), false);
        assert_eq!(tm.active(), ToolKind::None);
    }

    #[test]
    fn pan_mode_suppresses_tools() {
        let mut tm = ToolManager::new();
        tm.update(&ctx(None, 5.0, 5.0), false);
        tm.set_pan_mode(true, false);
        assert_eq!(tm.active(), ToolKind::None);
        tm.update(&ctx(None, 6.0, 6.0), false);
        assert_eq!(tm.active(), ToolKind::None);

        tm.set_pan_mode(false, false);
        tm.update(&ctx(None, 6.0, 6.0), false);
        assert_eq!(tm.active(), ToolKind::Create);
    }
}
