//! Editor tuning knobs.

use georef_core::HIT_RADIUS;
use serde::{Deserialize, Serialize};

/// Navigation limits and hit-test sizes for one editor instance.
///
/// Missing fields keep their defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Normalized wheel units per `zoom_step` factor.
    pub zoom_sensitivity: f64,
    /// Zoom factor applied per `zoom_sensitivity` wheel units.
    pub zoom_step: f64,
    /// Handle grab radius in screen pixels.
    pub hit_radius: f64,
    /// Outer edge of the rotate ring, as a multiple of `hit_radius`.
    pub rotate_zone: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            zoom_sensitivity: 50.0,
            zoom_step: 1.05,
            hit_radius: HIT_RADIUS,
            rotate_zone: 2.5,
        }
    }
}

impl EditorConfig {
    /// Replace unusable values with defaults and order the scale bounds.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let (min_scale, max_scale) = {
            let lo = positive(self.min_scale, d.min_scale);
            let hi = positive(self.max_scale, d.max_scale);
            if lo <= hi { (lo, hi) } else { (hi, lo) }
        };
        let rotate_zone = if self.rotate_zone.is_finite() && self.rotate_zone > 1.0 {
            self.rotate_zone
        } else {
            d.rotate_zone
        };
        Self {
            min_scale,
            max_scale,
            zoom_sensitivity: positive(self.zoom_sensitivity, d.zoom_sensitivity),
            zoom_step: positive(self.zoom_step, d.zoom_step),
            hit_radius: positive(self.hit_radius, d.hit_radius),
            rotate_zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"maxScale": 4.0}"#).unwrap();
        assert_eq!(config.max_scale, 4.0);
        assert_eq!(config.min_scale, 0.1);
        assert_eq!(config.hit_radius, 12.0);
    }

    #[test]
    fn sanitize_orders_and_repairs() {
        let config = EditorConfig {
            min_scale: 5.0,
            max_scale: 0.5,
            zoom_sensitivity: 0.0,
            hit_radius: f64::NAN,
            rotate_zone: 0.5,
            ..EditorConfig::default()
        }
        .sanitized();
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.max_scale, 5.0);
        assert_eq!(config.zoom_sensitivity, 50.0);
        assert_eq!(config.hit_radius, 12.0);
        assert_eq!(config.rotate_zone, 2.5);
    }
}
