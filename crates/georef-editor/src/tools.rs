//! Gesture controllers.
//!
//! Each tool turns a three-phase gesture (start, drag, end) into writes on
//! the [`TransformState`]. Tools hold no geometry of their own: the shape,
//! snapshot and drag anchor all live in the state, and the only other input
//! is a [`ToolContext`] naming the shape variant and the aspect lock.
//!
//! A phase that arrives without its precondition (a drag with no snapshot,
//! an end with no gesture) is a silent no-op.

use crate::events::EventKind;
use crate::state::TransformState;
use georef_core::transform::{create_shape, resize_shape, rotate_quad, translate_shape};
use georef_core::{HandleType, Point, Shape, ShapeKind};

/// Which controller a pointer gesture is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    /// Nothing under the pointer: the gesture pans the view.
    #[default]
    None,
    Create,
    Move,
    Resize(HandleType),
    Rotate,
}

/// One phase of a pointer gesture, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Start(Point),
    Drag(Point),
    End,
}

/// The slice of editor configuration a tool may read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolContext {
    pub shape_kind: ShapeKind,
    /// Width / height to hold while creating or resizing, if any.
    pub aspect_ratio: Option<f64>,
}

/// Trait for gesture controllers.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Apply one gesture phase, returning the notification to fire, if any.
    fn handle(
        &mut self,
        gesture: Gesture,
        state: &mut TransformState,
        ctx: &ToolContext,
    ) -> Option<EventKind>;
}

/// Route a gesture phase to the controller for `kind`.
pub fn dispatch(
    kind: ToolKind,
    gesture: Gesture,
    state: &mut TransformState,
    ctx: &ToolContext,
) -> Option<EventKind> {
    match kind {
        ToolKind::None => None,
        ToolKind::Create => CreateTool.handle(gesture, state, ctx),
        ToolKind::Move => MoveTool.handle(gesture, state, ctx),
        ToolKind::Resize(handle) => ResizeTool::new(handle).handle(gesture, state, ctx),
        ToolKind::Rotate => RotateTool.handle(gesture, state, ctx),
    }
}

/// Shared end phase for the edit tools.
fn finish_edit(state: &mut TransformState, tool: &str) -> Option<EventKind> {
    if state.end_edit() {
        log::trace!("{tool}: end");
        Some(EventKind::TransformChanged)
    } else {
        None
    }
}

// ─── Create Tool ─────────────────────────────────────────────────────────

/// Drag out a new shape from an anchor point.
#[derive(Debug, Default)]
pub struct CreateTool;

impl Tool for CreateTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Create
    }

    fn handle(
        &mut self,
        gesture: Gesture,
        state: &mut TransformState,
        ctx: &ToolContext,
    ) -> Option<EventKind> {
        match gesture {
            Gesture::Start(at) => {
                log::trace!("create: start at ({}, {})", at.x, at.y);
                state.clear_gesture();
                state.shape = Some(create_shape(ctx.shape_kind, at, at, None));
                state.drag_start = Some(at);
                state.is_creating = true;
                None
            }
            Gesture::Drag(at) => {
                if !state.is_creating {
                    return None;
                }
                let anchor = state.drag_start?;
                state.shape = Some(create_shape(ctx.shape_kind, anchor, at, ctx.aspect_ratio));
                None
            }
            Gesture::End => {
                if !state.is_creating {
                    return None;
                }
                state.clear_gesture();
                // A click without a drag leaves nothing to edit.
                let empty = state
                    .shape
                    .map(|s| s.to_quad().bounding_rect().area() <= 0.0)
                    .unwrap_or(true);
                if empty {
                    log::trace!("create: discarded zero-area shape");
                    state.shape = None;
                    return None;
                }
                log::trace!("create: end");
                Some(EventKind::BoundsCreated)
            }
        }
    }
}

// ─── Move Tool ───────────────────────────────────────────────────────────

/// Translate the whole shape by the pointer delta.
#[derive(Debug, Default)]
pub struct MoveTool;

impl Tool for MoveTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Move
    }

    fn handle(
        &mut self,
        gesture: Gesture,
        state: &mut TransformState,
        _ctx: &ToolContext,
    ) -> Option<EventKind> {
        match gesture {
            Gesture::Start(at) => {
                if state.begin_edit(at, HandleType::Body) {
                    log::trace!("move: start");
                }
                None
            }
            Gesture::Drag(at) => {
                let (snapshot, start) = state.gesture_base()?;
                state.shape = Some(translate_shape(&snapshot, start, at));
                None
            }
            Gesture::End => finish_edit(state, "move"),
        }
    }
}

// ─── Resize Tool ─────────────────────────────────────────────────────────

/// Drag one corner or edge while the opposite one stays put.
#[derive(Debug)]
pub struct ResizeTool {
    pub handle: HandleType,
}

impl ResizeTool {
    pub fn new(handle: HandleType) -> Self {
        Self { handle }
    }
}

impl Tool for ResizeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Resize(self.handle)
    }

    fn handle(
        &mut self,
        gesture: Gesture,
        state: &mut TransformState,
        ctx: &ToolContext,
    ) -> Option<EventKind> {
        match gesture {
            Gesture::Start(at) => {
                if !(self.handle.is_corner() || self.handle.is_edge()) {
                    return None;
                }
                if state.begin_edit(at, self.handle) {
                    log::trace!("resize: start {:?}", self.handle);
                }
                None
            }
            Gesture::Drag(at) => {
                let (snapshot, _) = state.gesture_base()?;
                state.shape = Some(resize_shape(
                    &snapshot,
                    state.active_handle,
                    at,
                    ctx.aspect_ratio,
                ));
                None
            }
            Gesture::End => finish_edit(state, "resize"),
        }
    }
}

// ─── Rotate Tool ─────────────────────────────────────────────────────────

/// Rotate a quad about its centroid. Rects are never rotated.
#[derive(Debug, Default)]
pub struct RotateTool;

impl Tool for RotateTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rotate
    }

    fn handle(
        &mut self,
        gesture: Gesture,
        state: &mut TransformState,
        _ctx: &ToolContext,
    ) -> Option<EventKind> {
        match gesture {
            Gesture::Start(at) => {
                if matches!(state.shape, Some(Shape::Quad(_))) && state.begin_edit(at, HandleType::None)
                {
                    log::trace!("rotate: start");
                }
                None
            }
            Gesture::Drag(at) => {
                let (Shape::Quad(snapshot), start) = state.gesture_base()? else {
                    return None;
                };
                state.shape = Some(Shape::Quad(rotate_quad(&snapshot, start, at)));
                None
            }
            Gesture::End => finish_edit(state, "rotate"),
        }
    }
}
