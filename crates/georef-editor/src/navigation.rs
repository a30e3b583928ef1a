//! Pan and zoom state.
//!
//! The scale is clamped at the one place it is written ([`NavigationState::set_scale`]),
//! so every reader sees a value inside `[min_scale, max_scale]`.

use crate::config::EditorConfig;
use crate::input::DeltaMode;
use georef_core::project::{screen_to_world, world_to_screen};
use kurbo::{Point, Vec2};
use serde::Serialize;

/// Clamp `value` into `[min, max]`. NaN resolves to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.max(min).min(max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    scale: f64,
    offset: Vec2,
    min_scale: f64,
    max_scale: f64,
    zoom_sensitivity: f64,
    zoom_step: f64,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl NavigationState {
    pub fn new(config: &EditorConfig) -> Self {
        let config = config.sanitized();
        Self {
            scale: clamp(1.0, config.min_scale, config.max_scale),
            offset: Vec2::ZERO,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_sensitivity: config.zoom_sensitivity,
            zoom_step: config.zoom_step,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Replace the zoom bounds and pull the current scale back inside them.
    pub fn set_scale_bounds(&mut self, min: f64, max: f64) {
        let bounds = EditorConfig {
            min_scale: min,
            max_scale: max,
            ..EditorConfig::default()
        }
        .sanitized();
        self.min_scale = bounds.min_scale;
        self.max_scale = bounds.max_scale;
        self.set_scale(self.scale);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp(scale, self.min_scale, self.max_scale);
    }

    /// Non-finite offsets are ignored.
    pub fn set_offset(&mut self, offset: Vec2) {
        if offset.is_finite() {
            self.offset = offset;
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.set_offset(self.offset + delta);
    }

    /// Back to scale 1, offset zero (world space == screen space).
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.set_scale(1.0);
    }

    pub fn to_world(&self, screen: Point) -> Point {
        screen_to_world(screen, self.offset, self.scale)
    }

    pub fn to_screen(&self, world: Point) -> Point {
        world_to_screen(world, self.offset, self.scale)
    }

    /// Multiply the scale by `factor`, keeping the world point under
    /// `anchor` (a screen point) fixed on screen.
    pub fn zoom_about(&mut self, anchor: Point, factor: f64) {
        let world = self.to_world(anchor);
        self.set_scale(self.scale * factor);
        self.set_offset(Vec2::new(
            anchor.x - world.x * self.scale,
            anchor.y - world.y * self.scale,
        ));
    }

    /// Apply a wheel event at screen point `anchor`.
    ///
    /// With `zoom` held the vertical delta zooms exponentially: normalized
    /// by `mode`, then `zoom_step ^ (-delta / zoom_sensitivity)`. Otherwise
    /// the view pans opposite the delta.
    pub fn apply_wheel(&mut self, anchor: Point, delta: Vec2, mode: DeltaMode, zoom: bool) {
        if zoom {
            let normalized = delta.y * mode.multiplier();
            let factor = self.zoom_step.powf(-normalized / self.zoom_sensitivity);
            log::trace!("wheel zoom: delta={normalized} factor={factor}");
            if factor.is_finite() && factor > 0.0 {
                self.zoom_about(anchor, factor);
            }
        } else {
            self.pan_by(-(delta * mode.multiplier()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-9;

    #[test]
    fn zoom_keeps_pointer_anchor() {
        let mut nav = NavigationState::default();
        let anchor = Point::new(100.0, 100.0);
        assert_eq!(nav.to_world(anchor), Point::new(100.0, 100.0));

        nav.zoom_about(anchor, 2.0);
        assert_eq!(nav.scale(), 2.0);
        let back = nav.to_screen(Point::new(100.0, 100.0));
        assert!((back.x - 100.0).abs() < EPS && (back.y - 100.0).abs() < EPS);
        assert_eq!(nav.offset(), Vec2::new(-100.0, -100.0));
    }

    #[test]
    fn wheel_zoom_keeps_anchor_at_any_offset() {
        let mut nav = NavigationState::default();
        nav.set_offset(Vec2::new(37.0, -12.0));
        nav.set_scale(1.7);
        let anchor = Point::new(240.0, 90.0);
        let world = nav.to_world(anchor);

        nav.apply_wheel(anchor, Vec2::new(0.0, -120.0), DeltaMode::Pixel, true);
        assert!(nav.scale() > 1.7);
        let back = nav.to_screen(world);
        assert!((back.x - anchor.x).abs() < EPS && (back.y - anchor.y).abs() < EPS);
    }

    #[test]
    fn scale_clamp_invariant() {
        let mut nav = NavigationState::default();
        let writes = [0.0, -3.0, 0.05, 0.5, 11.0, f64::INFINITY, f64::NAN, 9.99, 1e-12];
        for s in writes {
            nav.set_scale(s);
            assert!(
                nav.scale() >= nav.min_scale() && nav.scale() <= nav.max_scale(),
                "{s} -> {}",
                nav.scale()
            );
        }
        for _ in 0..200 {
            nav.apply_wheel(Point::ZERO, Vec2::new(0.0, -500.0), DeltaMode::Page, true);
        }
        assert_eq!(nav.scale(), nav.max_scale());
        for _ in 0..200 {
            nav.apply_wheel(Point::ZERO, Vec2::new(0.0, 500.0), DeltaMode::Page, true);
        }
        assert_eq!(nav.scale(), nav.min_scale());
    }

    #[test]
    fn narrowing_bounds_reclamps_scale() {
        let mut nav = NavigationState::default();
        nav.set_scale(8.0);
        nav.set_scale_bounds(0.5, 4.0);
        assert_eq!(nav.scale(), 4.0);
        assert_eq!((nav.min_scale(), nav.max_scale()), (0.5, 4.0));

        // Reversed bounds are reordered, bad ones fall back to defaults.
        nav.set_scale_bounds(6.0, 2.0);
        assert_eq!((nav.min_scale(), nav.max_scale()), (2.0, 6.0));
        assert_eq!(nav.scale(), 4.0);
        nav.set_scale_bounds(f64::NAN, 3.0);
        assert_eq!((nav.min_scale(), nav.max_scale()), (0.1, 3.0));
        assert_eq!(nav.scale(), 3.0);
    }

    #[test]
    fn wheel_without_ctrl_pans() {
        let mut nav = NavigationState::default();
        nav.apply_wheel(Point::ZERO, Vec2::new(10.0, -4.0), DeltaMode::Pixel, false);
        assert_eq!(nav.offset(), Vec2::new(-10.0, 4.0));
        nav.apply_wheel(Point::ZERO, Vec2::new(0.0, 1.0), DeltaMode::Line, false);
        assert_eq!(nav.offset(), Vec2::new(-10.0, -12.0));
        assert_eq!(nav.scale(), 1.0);
    }

    #[test]
    fn reset_restores_identity() {
        let mut nav = NavigationState::default();
        nav.zoom_about(Point::new(50.0, 50.0), 3.0);
        nav.reset();
        assert_eq!(nav.scale(), 1.0);
        assert_eq!(nav.offset(), Vec2::ZERO);
    }
}
