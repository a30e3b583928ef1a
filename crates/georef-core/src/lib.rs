pub mod geo;
pub mod hit;
pub mod model;
pub mod project;
pub mod transform;

pub use geo::{AffineProjection, GeoCorners, GeoPoint, GeoProjection, detect_geo_handle};
pub use hit::{HIT_RADIUS, detect_handle};
pub use model::*;
pub use project::{CanvasGeometry, PointerCoords};

// Re-export kurbo so downstream crates share one geometry version.
pub use kurbo;
