//! Coordinate projector: client → screen → world and back.
//!
//! Screen space is the canvas backing store (device pixels, after the
//! CSS-to-backing-store ratio is applied). World space is screen space with
//! the navigation pan offset removed and the zoom scale divided out.
//!
//! Every function here is pure and total. A zero or non-finite scale is
//! treated as identity so nothing downstream ever sees NaN or infinity.

use crate::model::{Point, Vec2};
use smallvec::SmallVec;

/// Geometry of the canvas element as the browser reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Bounding-rect origin in client coordinates.
    pub left: f64,
    pub top: f64,
    /// CSS box size.
    pub css_width: f64,
    pub css_height: f64,
    /// Backing-store size (`canvas.width` / `canvas.height`).
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl CanvasGeometry {
    /// A canvas at the client origin with a backing store of `css * dpr`.
    pub fn new(css_width: f64, css_height: f64, dpr: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            css_width,
            css_height,
            pixel_width: css_width * dpr,
            pixel_height: css_height * dpr,
        }
    }

    pub fn with_origin(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Backing-store pixels per CSS pixel, per axis. An unsized canvas maps 1:1.
    pub fn pixel_ratio(&self) -> Vec2 {
        let ratio = |pixels: f64, css: f64| {
            let r = pixels / css;
            if r.is_finite() && r > 0.0 { r } else { 1.0 }
        };
        Vec2::new(
            ratio(self.pixel_width, self.css_width),
            ratio(self.pixel_height, self.css_height),
        )
    }
}

/// Client coordinates carried by a pointer event.
///
/// Mouse events carry one position; touch events carry a list and the first
/// touch is the active pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerCoords {
    Mouse { client: Point },
    Touch { touches: SmallVec<[Point; 2]> },
}

impl PointerCoords {
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self::Mouse {
            client: Point::new(client_x, client_y),
        }
    }

    pub fn touch(touches: impl IntoIterator<Item = Point>) -> Self {
        Self::Touch {
            touches: touches.into_iter().collect(),
        }
    }

    /// The active pointer position, if the event carries one.
    pub fn client_point(&self) -> Option<Point> {
        match self {
            Self::Mouse { client } => Some(*client),
            Self::Touch { touches } => touches.first().copied(),
        }
    }
}

fn effective_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale != 0.0 {
        scale
    } else {
        1.0
    }
}

/// Client coordinates → canvas backing-store pixels.
///
/// A touch event with an empty touch list maps to the canvas origin.
pub fn event_to_screen_point(event: &PointerCoords, canvas: &CanvasGeometry) -> Point {
    let client = event
        .client_point()
        .unwrap_or(Point::new(canvas.left, canvas.top));
    let ratio = canvas.pixel_ratio();
    Point::new(
        (client.x - canvas.left) * ratio.x,
        (client.y - canvas.top) * ratio.y,
    )
}

/// `(screen - offset) / scale`, per axis.
pub fn screen_to_world(screen: Point, offset: Vec2, scale: f64) -> Point {
    let s = effective_scale(scale);
    Point::new((screen.x - offset.x) / s, (screen.y - offset.y) / s)
}

/// `world * scale + offset`, per axis.
pub fn world_to_screen(world: Point, offset: Vec2, scale: f64) -> Point {
    let s = effective_scale(scale);
    Point::new(world.x * s + offset.x, world.y * s + offset.y)
}

pub fn event_to_world(
    event: &PointerCoords,
    canvas: &CanvasGeometry,
    offset: Vec2,
    scale: f64,
) -> Point {
    screen_to_world(event_to_screen_point(event, canvas), offset, scale)
}

/// Convert a screen-space length (e.g. a hit radius) into world units.
pub fn screen_distance_to_world(distance: f64, scale: f64) -> f64 {
    distance / effective_scale(scale).abs()
}
