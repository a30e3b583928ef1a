//! Anchor-preserving shape math for the create, move, resize and rotate
//! gestures.
//!
//! Every function takes the shape as it was when the gesture started (the
//! snapshot) plus the gesture's start and current world points, and returns
//! a fresh shape. Nothing accumulates across pointer moves, so a long drag
//! cannot drift.

use crate::model::{ClipRect, HandleType, Point, Quad, Shape, ShapeKind};
use kurbo::{Affine, Vec2};

/// Distances below this are treated as coincident points.
const DEGENERATE_EPSILON: f64 = 1e-9;

// ─── Aspect lock ─────────────────────────────────────────────────────────

/// Fit `width × height` to `ratio` (width / height).
///
/// When `width / ratio > height` the height follows the width, otherwise the
/// width follows the height. Without a ratio the size is returned unchanged.
pub fn constrain_aspect(width: f64, height: f64, ratio: Option<f64>) -> (f64, f64) {
    let Some(ratio) = ratio.filter(|r| r.is_finite() && *r > 0.0) else {
        return (width, height);
    };
    if width / ratio > height {
        (width, width / ratio)
    } else {
        (height * ratio, height)
    }
}

/// Lay out an axis-aligned `width × height` box with `anchor` at the corner
/// facing away from `pointer`.
///
/// The four branches correspond to the pointer being right+below, left+below,
/// right+above or left+above the anchor.
pub fn place_from_anchor(anchor: Point, pointer: Point, width: f64, height: f64) -> Quad {
    let right = pointer.x >= anchor.x;
    let below = pointer.y >= anchor.y;
    let (a, w, h) = (anchor, width, height);
    match (right, below) {
        (true, true) => Quad::new(
            a,
            Point::new(a.x + w, a.y),
            Point::new(a.x, a.y + h),
            Point::new(a.x + w, a.y + h),
        ),
        (false, true) => Quad::new(
            Point::new(a.x - w, a.y),
            a,
            Point::new(a.x - w, a.y + h),
            Point::new(a.x, a.y + h),
        ),
        (true, false) => Quad::new(
            Point::new(a.x, a.y - h),
            Point::new(a.x + w, a.y - h),
            a,
            Point::new(a.x + w, a.y),
        ),
        (false, false) => Quad::new(
            Point::new(a.x - w, a.y - h),
            Point::new(a.x, a.y - h),
            Point::new(a.x - w, a.y),
            a,
        ),
    }
}

// ─── Create ──────────────────────────────────────────────────────────────

/// The box spanned by `anchor` and `pointer`, optionally aspect-locked.
pub fn create_box(anchor: Point, pointer: Point, ratio: Option<f64>) -> Quad {
    let (w, h) = constrain_aspect(
        (pointer.x - anchor.x).abs(),
        (pointer.y - anchor.y).abs(),
        ratio,
    );
    place_from_anchor(anchor, pointer, w, h)
}

pub fn create_shape(kind: ShapeKind, anchor: Point, pointer: Point, ratio: Option<f64>) -> Shape {
    let quad = create_box(anchor, pointer, ratio);
    match kind {
        ShapeKind::Rect => Shape::Rect(quad.bounding_rect()),
        ShapeKind::Quad => Shape::Quad(quad),
    }
}

// ─── Move ────────────────────────────────────────────────────────────────

/// Snapshot shifted by `current - start`.
pub fn translate_shape(snapshot: &Shape, start: Point, current: Point) -> Shape {
    snapshot.translated(current - start)
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// Resize an axis-aligned rect by dragging `handle` to `pointer`.
///
/// Corners yield the bounding box of the opposite corner and the pointer.
/// Edges move one axis only, anchored on the opposite edge. Width and height
/// stay non-negative because the result is always rebuilt from two points.
pub fn resize_rect(snapshot: &ClipRect, handle: HandleType, pointer: Point) -> ClipRect {
    let s = snapshot;
    match handle {
        h if h.is_corner() => match s.handle_point(h.opposite()) {
            Some(anchor) => ClipRect::from_points(anchor, pointer),
            None => *s,
        },
        HandleType::Left => ClipRect::from_points(
            Point::new(s.max_x(), s.min_y()),
            Point::new(pointer.x, s.max_y()),
        ),
        HandleType::Right => ClipRect::from_points(
            Point::new(s.min_x(), s.min_y()),
            Point::new(pointer.x, s.max_y()),
        ),
        HandleType::Top => ClipRect::from_points(
            Point::new(s.min_x(), s.max_y()),
            Point::new(s.max_x(), pointer.y),
        ),
        HandleType::Bottom => ClipRect::from_points(
            Point::new(s.min_x(), s.min_y()),
            Point::new(s.max_x(), pointer.y),
        ),
        _ => *s,
    }
}

/// Maps world space into the quad's own frame: top-left at the origin and
/// the top edge along +x.
fn local_frame(quad: &Quad) -> Affine {
    Affine::rotate(-quad.rotation()) * Affine::translate(-quad.top_left.to_vec2())
}

/// Resize a free quad by dragging `handle` to `pointer`.
///
/// The math runs in the quad's local frame, so rotated quads keep their
/// rotation. Corners anchor on the opposite corner and reuse the create
/// placement (including the aspect lock). Edges anchor on the opposite edge;
/// with an aspect lock the other dimension follows and stays centered.
pub fn resize_quad(
    snapshot: &Quad,
    handle: HandleType,
    pointer: Point,
    ratio: Option<f64>,
) -> Quad {
    if !(handle.is_corner() || handle.is_edge()) {
        return *snapshot;
    }
    let to_local = local_frame(snapshot);
    let to_world = to_local.inverse();
    let bounds = snapshot.map(|p| to_local * p).bounding_rect();
    let p = to_local * pointer;

    let local = if handle.is_corner() {
        let Some(anchor) = bounds.handle_point(handle.opposite()) else {
            return *snapshot;
        };
        create_box(anchor, p, ratio)
    } else {
        resize_edge_local(&bounds, handle, p, ratio)
    };

    // A collapsed box has no rotation left to carry into the next resize.
    let extent = local.bounding_rect();
    if extent.width < DEGENERATE_EPSILON || extent.height < DEGENERATE_EPSILON {
        log::trace!("resize {handle:?}: collapsed box, keeping snapshot");
        return *snapshot;
    }
    let result = local.map(|q| to_world * q);
    if result.is_finite() { result } else { *snapshot }
}

fn resize_edge_local(bounds: &ClipRect, handle: HandleType, p: Point, ratio: Option<f64>) -> Quad {
    let center = bounds.center();
    let ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
    let rect = match handle {
        HandleType::Left | HandleType::Right => {
            let anchor_x = if handle == HandleType::Left {
                bounds.max_x()
            } else {
                bounds.min_x()
            };
            let width = (p.x - anchor_x).abs();
            let height = ratio.map_or(bounds.height, |r| width / r);
            ClipRect::new(
                Point::new(anchor_x.min(p.x), center.y - height / 2.0),
                width,
                height,
            )
        }
        _ => {
            let anchor_y = if handle == HandleType::Top {
                bounds.max_y()
            } else {
                bounds.min_y()
            };
            let height = (p.y - anchor_y).abs();
            let width = ratio.map_or(bounds.width, |r| height * r);
            ClipRect::new(
                Point::new(center.x - width / 2.0, anchor_y.min(p.y)),
                width,
                height,
            )
        }
    };
    rect.to_quad()
}

/// Resize either shape variant. Rects ignore the aspect lock.
pub fn resize_shape(
    snapshot: &Shape,
    handle: HandleType,
    pointer: Point,
    ratio: Option<f64>,
) -> Shape {
    match snapshot {
        Shape::Rect(r) => Shape::Rect(resize_rect(r, handle, pointer)),
        Shape::Quad(q) => Shape::Quad(resize_quad(q, handle, pointer, ratio)),
    }
}

// ─── Rotate ──────────────────────────────────────────────────────────────

/// Angle swept from `start` to `current` around `center`, in radians.
///
/// Returns 0 when either point coincides with the center, where `atan2` has
/// no meaningful answer.
pub fn rotation_delta(center: Point, start: Point, current: Point) -> f64 {
    let from: Vec2 = start - center;
    let to: Vec2 = current - center;
    if from.hypot() < DEGENERATE_EPSILON || to.hypot() < DEGENERATE_EPSILON {
        log::trace!("rotation about {center:?}: pointer on the pivot, no delta");
        return 0.0;
    }
    let delta = to.atan2() - from.atan2();
    if delta.is_finite() { delta } else { 0.0 }
}

/// Rotate the snapshot about its own centroid by the angle swept from
/// `start` to `current`.
pub fn rotate_quad(snapshot: &Quad, start: Point, current: Point) -> Quad {
    let center = snapshot.centroid();
    let delta = rotation_delta(center, start, current);
    if delta == 0.0 {
        return *snapshot;
    }
    let rotation = Affine::rotate_about(delta, center);
    snapshot.map(|p| rotation * p)
}
