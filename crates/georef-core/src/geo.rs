//! Geo-projection boundary for the overlay editor.
//!
//! The map component owns the actual projection; the editor only sees the
//! [`GeoProjection`] trait. [`GeoCorners`] is the hand-off struct persisted by
//! the surrounding application.

use crate::hit::{is_inside_polygon, is_near_point};
use crate::model::{HandleType, Point, Quad};
use kurbo::Affine;
use serde::{Deserialize, Serialize};

/// Fraction of the TL-BR diagonal used as the geo-space grab radius.
pub const GEO_HIT_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Treat (lng, lat) as a plain planar point.
    fn to_plane(self) -> Point {
        Point::new(self.lng, self.lat)
    }
}

/// Four corners in longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCorners {
    pub top_left: GeoPoint,
    pub top_right: GeoPoint,
    pub bottom_right: GeoPoint,
    pub bottom_left: GeoPoint,
}

impl GeoCorners {
    /// Project every corner of a world-space quad.
    pub fn from_quad(quad: &Quad, projection: &impl GeoProjection) -> Result<Self, String> {
        Ok(Self {
            top_left: projection.project(quad.top_left)?,
            top_right: projection.project(quad.top_right)?,
            bottom_right: projection.project(quad.bottom_right)?,
            bottom_left: projection.project(quad.bottom_left)?,
        })
    }

    /// Unproject back to a world-space quad.
    pub fn to_quad(&self, projection: &impl GeoProjection) -> Result<Quad, String> {
        Ok(Quad::new(
            projection.unproject(self.top_left)?,
            projection.unproject(self.top_right)?,
            projection.unproject(self.bottom_left)?,
            projection.unproject(self.bottom_right)?,
        ))
    }

    fn plane_quad(&self) -> Quad {
        Quad::new(
            self.top_left.to_plane(),
            self.top_right.to_plane(),
            self.bottom_left.to_plane(),
            self.bottom_right.to_plane(),
        )
    }

    /// Grab radius in degrees: a fixed fraction of the TL-BR diagonal, so it
    /// tracks the overlay's apparent size at any map zoom.
    pub fn hit_radius(&self) -> f64 {
        self.top_left.to_plane().distance(self.bottom_right.to_plane()) * GEO_HIT_FRACTION
    }
}

/// Bidirectional world ↔ geo mapping supplied by the map component.
pub trait GeoProjection {
    fn project(&self, world: Point) -> Result<GeoPoint, String>;
    fn unproject(&self, geo: GeoPoint) -> Result<Point, String>;
}

/// Projection by a fixed affine map: world `(x, y)` → `(lng, lat)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineProjection(pub Affine);

impl GeoProjection for AffineProjection {
    fn project(&self, world: Point) -> Result<GeoPoint, String> {
        let p = self.0 * world;
        Ok(GeoPoint::new(p.x, p.y))
    }

    fn unproject(&self, geo: GeoPoint) -> Result<Point, String> {
        if self.0.determinant().abs() < f64::EPSILON {
            return Err("projection is not invertible".to_string());
        }
        Ok(self.0.inverse() * geo.to_plane())
    }
}

/// Corner/body hit test in lng/lat space.
///
/// Edges are not offered here; only corners (TL, TR, BR, BL) and the
/// interior.
pub fn detect_geo_handle(point: GeoPoint, corners: &GeoCorners) -> HandleType {
    let radius = corners.hit_radius();
    let p = point.to_plane();
    let quad = corners.plane_quad();
    for handle in HandleType::CORNERS {
        if let Some(at) = quad.handle_point(handle)
            && is_near_point(p, at, radius)
        {
            return handle;
        }
    }
    if is_inside_polygon(p, &quad) {
        HandleType::Body
    } else {
        HandleType::None
    }
}
