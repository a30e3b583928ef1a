//! Integration tests: seeded corners, transform sessions and geo hand-off.

use georef_core::{
    AffineProjection, CanvasGeometry, GeoCorners, GeoPoint, HandleType, Point, PointerCoords, Quad,
    RasterSize,
};
use georef_editor::{Editor, EditorMode, EventKind, StateSnapshot};
use kurbo::{Affine, Vec2};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn placed_quad() -> Quad {
    Quad::new(
        Point::new(100.0, 100.0),
        Point::new(300.0, 120.0),
        Point::new(90.0, 250.0),
        Point::new(290.0, 270.0),
    )
}

fn overlay() -> Editor {
    let mut editor = Editor::overlay();
    editor.set_canvas(CanvasGeometry::new(800.0, 600.0, 1.0));
    editor.set_raster(Ok(RasterSize::new(400.0, 300.0))).unwrap();
    editor
}

/// 1 px = 0.0001 degrees, y flipped.
fn projection() -> AffineProjection {
    AffineProjection(
        Affine::translate(Vec2::new(-122.4, 37.8))
            * Affine::new([0.0001, 0.0, 0.0, -0.0001, 0.0, 0.0]),
    )
}

fn record(editor: &mut Editor) -> Rc<RefCell<Vec<(EventKind, EditorMode)>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for kind in EventKind::ALL {
        let s = seen.clone();
        editor.add_listener(
            kind,
            Rc::new(move |snap: &StateSnapshot| s.borrow_mut().push((snap.event, snap.mode))),
        );
    }
    seen
}

#[test]
fn initialize_with_corners_does_not_report_creation() {
    let mut editor = overlay();
    let seen = record(&mut editor);

    editor.initialize_with_corners(placed_quad(), None).unwrap();

    assert_eq!(editor.corners(), Some(placed_quad()));
    assert!(editor.is_initialized());
    assert_eq!(
        *seen.borrow(),
        vec![(EventKind::ModeChanged, EditorMode::Edit)]
    );
}

#[test]
fn non_finite_corners_are_rejected() {
    let mut editor = overlay();
    let mut bad = placed_quad();
    bad.top_left.x = f64::NAN;
    assert!(editor.initialize_with_corners(bad, None).is_err());
    assert_eq!(editor.corners(), None);
}

#[test]
fn transform_session_saves_and_restores_navigation() {
    let mut editor = overlay();
    editor.zoom_about(Point::new(200.0, 200.0), 3.0);
    editor.pan_by(Vec2::new(15.0, -5.0));
    let saved = *editor.navigation();

    editor.begin_transform_session(placed_quad()).unwrap();
    assert!(editor.in_transform_session());
    assert_eq!(editor.navigation().scale(), 1.0);
    assert_eq!(editor.navigation().offset(), Vec2::ZERO);
    assert_eq!(editor.mode(), EditorMode::Edit);

    // With identity navigation, screen points hit the quad directly.
    editor.pointer_move(&PointerCoords::mouse(100.0, 100.0));
    assert_eq!(editor.cursor(), "nwse-resize");

    let corners = editor.end_transform_session();
    assert_eq!(corners, Some(placed_quad()));
    assert_eq!(*editor.navigation(), saved);
    assert!(!editor.in_transform_session());
    assert_eq!(editor.mode(), EditorMode::Create);
}

#[test]
fn geo_corners_round_trip() {
    let mut editor = overlay();
    editor.initialize_with_corners(placed_quad(), None).unwrap();
    let proj = projection();

    let geo = editor.geo_corners(&proj).unwrap();
    assert!((geo.top_left.lng - -122.39).abs() < 1e-9);
    assert!((geo.top_left.lat - 37.79).abs() < 1e-9);
    assert_eq!(editor.cached_geo_corners(), Some(&geo));

    let seen = record(&mut editor);
    let shifted = GeoCorners {
        top_left: GeoPoint::new(geo.top_left.lng + 0.001, geo.top_left.lat),
        top_right: GeoPoint::new(geo.top_right.lng + 0.001, geo.top_right.lat),
        bottom_right: GeoPoint::new(geo.bottom_right.lng + 0.001, geo.bottom_right.lat),
        bottom_left: GeoPoint::new(geo.bottom_left.lng + 0.001, geo.bottom_left.lat),
    };
    editor.set_geo_corners(&shifted, &proj).unwrap();

    let moved = editor.corners().unwrap();
    assert!(moved.top_left.distance(Point::new(110.0, 100.0)) < 1e-6);
    assert_eq!(
        *seen.borrow(),
        vec![(EventKind::TransformChanged, EditorMode::Edit)]
    );
}

#[test]
fn geo_snapshot_carries_the_applied_corners() {
    let mut editor = overlay();
    editor.initialize_with_corners(placed_quad(), None).unwrap();
    let proj = projection();
    let target = GeoCorners::from_quad(
        &placed_quad().translated(Vec2::new(40.0, -10.0)),
        &proj,
    )
    .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    editor.add_listener(
        EventKind::TransformChanged,
        Rc::new(move |snap: &StateSnapshot| s.borrow_mut().push(snap.geo_corners)),
    );

    editor.set_geo_corners(&target, &proj).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(target)]);
    assert_eq!(editor.cached_geo_corners(), Some(&target));

    // A singular projection fails before anything changes.
    let flat = AffineProjection(Affine::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
    assert!(editor.set_geo_corners(&target, &flat).is_err());
    assert_eq!(editor.cached_geo_corners(), Some(&target));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn gesture_drops_stale_geo_corners() {
    let mut editor = overlay();
    editor.initialize_with_corners(placed_quad(), None).unwrap();
    editor.geo_corners(&projection()).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    editor.add_listener(
        EventKind::TransformChanged,
        Rc::new(move |snap: &StateSnapshot| s.borrow_mut().push(snap.geo_corners)),
    );

    let at = placed_quad().centroid();
    editor.pointer_move(&PointerCoords::mouse(at.x, at.y));
    editor.pointer_down(&PointerCoords::mouse(at.x, at.y));
    editor.pointer_move(&PointerCoords::mouse(at.x + 10.0, at.y));
    editor.pointer_up(&PointerCoords::mouse(at.x + 10.0, at.y));

    assert_eq!(*seen.borrow(), vec![None]);
    assert_eq!(editor.cached_geo_corners(), None);
    let fresh = editor.geo_corners(&projection()).unwrap();
    assert!((fresh.top_left.lng - (-122.39 + 0.001)).abs() < 1e-9);
}

#[test]
fn geo_corners_need_a_shape() {
    let mut editor = overlay();
    assert!(editor.geo_corners(&projection()).is_err());
}

#[test]
fn geo_handle_uses_cached_corners() {
    let mut editor = overlay();
    assert_eq!(
        editor.detect_geo_handle(GeoPoint::new(0.0, 0.0)),
        HandleType::None
    );

    let geo = GeoCorners {
        top_left: GeoPoint::new(0.0, 1.0),
        top_right: GeoPoint::new(1.0, 1.0),
        bottom_right: GeoPoint::new(1.0, 0.0),
        bottom_left: GeoPoint::new(0.0, 0.0),
    };
    editor.initialize_with_corners(placed_quad(), Some(geo)).unwrap();
    assert_eq!(
        editor.detect_geo_handle(GeoPoint::new(0.99, 0.98)),
        HandleType::TopRight
    );
    assert_eq!(
        editor.detect_geo_handle(GeoPoint::new(0.5, 0.5)),
        HandleType::Body
    );
}

#[test]
fn reset_returns_to_create_mode() {
    let mut editor = overlay();
    editor.initialize_with_corners(placed_quad(), None).unwrap();
    let seen = record(&mut editor);

    editor.reset();

    assert_eq!(editor.corners(), None);
    assert_eq!(editor.mode(), EditorMode::Create);
    assert!(editor.is_loaded());
    assert_eq!(
        *seen.borrow(),
        vec![(EventKind::ModeChanged, EditorMode::Create)]
    );

    editor.clear_listeners(EventKind::ModeChanged);
    editor.initialize_with_corners(placed_quad(), None).unwrap();
    editor.reset();
    assert_eq!(seen.borrow().len(), 1);
}
