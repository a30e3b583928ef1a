//! Hit testing: pointer position → handle.
//!
//! All predicates are pure. The radius passed in must be expressed in the
//! same space as the points; callers working in world space scale the
//! screen-pixel [`HIT_RADIUS`] with [`scaled_hit_radius`] first.

use crate::model::{ClipRect, HandleType, Point, Quad, Shape};
use crate::project::screen_distance_to_world;

/// Handle grab radius in screen pixels.
pub const HIT_RADIUS: f64 = 12.0;

/// Inclusive axis-aligned bounds test.
pub fn is_inside_rect(point: Point, rect: &ClipRect) -> bool {
    rect.contains(point)
}

/// Even-odd ray cast against the quad in winding order (TL, TR, BR, BL).
pub fn is_inside_polygon(point: Point, quad: &Quad) -> bool {
    let poly = quad.polygon();
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn is_near_point(a: Point, b: Point, radius: f64) -> bool {
    a.distance(b) <= radius
}

/// The screen-space hit radius expressed in world units at `scale`.
pub fn scaled_hit_radius(radius: f64, scale: f64) -> f64 {
    screen_distance_to_world(radius, scale)
}

/// Interior test for either shape variant.
pub fn is_inside_shape(point: Point, shape: &Shape) -> bool {
    match shape {
        Shape::Rect(r) => is_inside_rect(point, r),
        Shape::Quad(q) => is_inside_polygon(point, q),
    }
}

/// Resolve which handle `point` grabs.
///
/// Corners are tested first (TL, TR, BR, BL), then edge midpoints
/// (L, R, T, B), then the interior. The first match wins.
pub fn detect_handle(point: Point, shape: &Shape, radius: f64) -> HandleType {
    for (handle, at) in shape.handle_points() {
        if is_near_point(point, at, radius) {
            return handle;
        }
    }
    if is_inside_shape(point, shape) {
        HandleType::Body
    } else {
        HandleType::None
    }
}

/// True when `point` sits in the ring just outside a quad corner: outside
/// the quad, beyond the corner's grab radius, but within `zone * radius`.
pub fn is_in_rotate_zone(point: Point, quad: &Quad, radius: f64, zone: f64) -> bool {
    if is_inside_polygon(point, quad) {
        return false;
    }
    let outer = radius * zone;
    quad.polygon().iter().any(|&corner| {
        let d = point.distance(corner);
        d > radius && d <= outer
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn square_at_origin(side: f64) -> Quad {
        let h = side / 2.0;
        Quad::new(
            Point::new(-h, -h),
            Point::new(h, -h),
            Point::new(-h, h),
            Point::new(h, h),
        )
    }

    #[test]
    fn rect_hit_radius_scenario() {
        let shape = Shape::Rect(ClipRect::new(Point::ZERO, 100.0, 100.0));
        assert_eq!(
            detect_handle(Point::new(6.0, 6.0), &shape, HIT_RADIUS),
            HandleType::TopLeft
        );
        assert_eq!(
            detect_handle(Point::new(50.0, 50.0), &shape, HIT_RADIUS),
            HandleType::Body
        );
        assert_eq!(
            detect_handle(Point::new(200.0, 200.0), &shape, HIT_RADIUS),
            HandleType::None
        );
    }

    #[test]
    fn corner_beats_body() {
        let shape = Shape::Quad(square_at_origin(100.0));
        for (corner, expected) in [
            (Point::new(-50.0, -50.0), HandleType::TopLeft),
            (Point::new(50.0, -50.0), HandleType::TopRight),
            (Point::new(50.0, 50.0), HandleType::BottomRight),
            (Point::new(-50.0, 50.0), HandleType::BottomLeft),
        ] {
            assert_eq!(detect_handle(corner, &shape, HIT_RADIUS), expected);
        }
    }

    #[test]
    fn edge_midpoints_detected() {
        let shape = Shape::Rect(ClipRect::new(Point::ZERO, 100.0, 60.0));
        assert_eq!(
            detect_handle(Point::new(2.0, 30.0), &shape, HIT_RADIUS),
            HandleType::Left
        );
        assert_eq!(
            detect_handle(Point::new(98.0, 31.0), &shape, HIT_RADIUS),
            HandleType::Right
        );
        assert_eq!(
            detect_handle(Point::new(50.0, -3.0), &shape, HIT_RADIUS),
            HandleType::Top
        );
        assert_eq!(
            detect_handle(Point::new(50.0, 61.0), &shape, HIT_RADIUS),
            HandleType::Bottom
        );
    }

    #[test]
    fn corner_order_breaks_ties() {
        // In a tiny shape every handle is within radius; TL must win.
        let shape = Shape::Rect(ClipRect::new(Point::ZERO, 4.0, 4.0));
        assert_eq!(
            detect_handle(Point::new(2.0, 2.0), &shape, HIT_RADIUS),
            HandleType::TopLeft
        );
    }

    #[test]
    fn polygon_uses_winding_order() {
        // Rotated 45 degrees: a diamond around (0, 0).
        let q = Quad::new(
            Point::new(0.0, -10.0),
            Point::new(10.0, 0.0),
            Point::new(-10.0, 0.0),
            Point::new(0.0, 10.0),
        );
        assert!(is_inside_polygon(Point::new(0.0, 0.0), &q));
        assert!(is_inside_polygon(Point::new(4.0, 4.0), &q));
        assert!(!is_inside_polygon(Point::new(8.0, 8.0), &q));
    }

    #[test]
    fn scaled_radius_shrinks_when_zoomed_in() {
        assert_eq!(scaled_hit_radius(HIT_RADIUS, 2.0), 6.0);
        assert_eq!(scaled_hit_radius(HIT_RADIUS, 0.5), 24.0);
        assert_eq!(scaled_hit_radius(HIT_RADIUS, 0.0), HIT_RADIUS);
    }

    #[test]
    fn rotate_zone_ring() {
        let q = square_at_origin(100.0);
        // Just past the grab radius, diagonally outside TR.
        assert!(is_in_rotate_zone(Point::new(62.0, -62.0), &q, HIT_RADIUS, 2.5));
        // Inside the grab radius: resize, not rotate.
        assert!(!is_in_rotate_zone(Point::new(55.0, -55.0), &q, HIT_RADIUS, 2.5));
        // Too far away.
        assert!(!is_in_rotate_zone(Point::new(100.0, -100.0), &q, HIT_RADIUS, 2.5));
        // Inside the quad never rotates.
        assert!(!is_in_rotate_zone(Point::new(35.0, -35.0), &q, HIT_RADIUS, 2.5));
    }
}
