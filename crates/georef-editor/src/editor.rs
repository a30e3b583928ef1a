//! Editor facade.
//!
//! One [`Editor`] drives either variant: the clipper crops the raster with an
//! axis-aligned rect, the overlay places it on the map with a free quad. The
//! facade owns the navigation, transform state, tool manager and listener
//! table; everything else in the crate is called from here.

use crate::config::EditorConfig;
use crate::events::{EditorMode, EventKind, Listener, Listeners, StateSnapshot};
use crate::input::{DeltaMode, InputEvent, Modifiers, PAN_KEY};
use crate::navigation::NavigationState;
use crate::state::TransformState;
use crate::tool_manager::{HitContext, ToolManager};
use crate::tools::{Gesture, ToolContext, ToolKind, dispatch};
use georef_core::geo::{GeoCorners, GeoPoint, GeoProjection, detect_geo_handle};
use georef_core::hit::scaled_hit_radius;
use georef_core::project::{event_to_screen_point, screen_to_world};
use georef_core::{
    CanvasGeometry, ClipRect, HandleType, Point, PointerCoords, Quad, RasterSize, Shape, ShapeKind,
};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorVariant {
    /// Axis-aligned crop rectangle over the raster.
    Clipper,
    /// Free quad placed over the basemap.
    Overlay,
}

impl EditorVariant {
    pub fn shape_kind(self) -> ShapeKind {
        match self {
            Self::Clipper => ShapeKind::Rect,
            Self::Overlay => ShapeKind::Quad,
        }
    }
}

/// CSS cursor name for a tool.
pub fn cursor_for(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::None => "grab",
        ToolKind::Create => "crosshair",
        ToolKind::Move => "move",
        ToolKind::Rotate => "alias",
        ToolKind::Resize(handle) => match handle {
            HandleType::TopLeft | HandleType::BottomRight => "nwse-resize",
            HandleType::TopRight | HandleType::BottomLeft => "nesw-resize",
            HandleType::Left | HandleType::Right => "ew-resize",
            HandleType::Top | HandleType::Bottom => "ns-resize",
            HandleType::Body => "move",
            HandleType::None => "default",
        },
    }
}

pub struct Editor {
    variant: EditorVariant,
    config: EditorConfig,
    canvas: CanvasGeometry,
    nav: NavigationState,
    state: TransformState,
    tools: ToolManager,
    listeners: Listeners,
    raster: Option<RasterSize>,
    geo: Option<GeoCorners>,
    pointer_down: bool,
    /// Last screen point of an in-progress pan drag.
    pan_from: Option<Point>,
    /// Navigation saved by `begin_transform_session`.
    saved_nav: Option<NavigationState>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("variant", &self.variant)
            .field("mode", &self.mode())
            .field("shape", &self.state.shape)
            .field("nav", &self.nav)
            .field("tool", &self.tools.active())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(variant: EditorVariant, config: EditorConfig) -> Self {
        let config = config.sanitized();
        Self {
            variant,
            config,
            canvas: CanvasGeometry::default(),
            nav: NavigationState::new(&config),
            state: TransformState::new(),
            tools: ToolManager::new(),
            listeners: Listeners::new(),
            raster: None,
            geo: None,
            pointer_down: false,
            pan_from: None,
            saved_nav: None,
        }
    }

    pub fn clipper() -> Self {
        Self::new(EditorVariant::Clipper, EditorConfig::default())
    }

    pub fn overlay() -> Self {
        Self::new(EditorVariant::Overlay, EditorConfig::default())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn variant(&self) -> EditorVariant {
        self.variant
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn canvas(&self) -> &CanvasGeometry {
        &self.canvas
    }

    pub fn raster(&self) -> Option<RasterSize> {
        self.raster
    }

    pub fn is_loaded(&self) -> bool {
        self.raster.is_some()
    }

    /// A finished shape exists (not mid-create).
    pub fn is_initialized(&self) -> bool {
        self.state.shape.is_some() && !self.state.is_creating
    }

    pub fn mode(&self) -> EditorMode {
        if self.is_initialized() {
            EditorMode::Edit
        } else {
            EditorMode::Create
        }
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.state.shape.as_ref()
    }

    /// Corners of the current shape; rects convert without rotation.
    pub fn corners(&self) -> Option<Quad> {
        self.state.shape.map(|s| s.to_quad())
    }

    pub fn rect(&self) -> Option<ClipRect> {
        self.state.shape.and_then(|s| s.as_rect().copied())
    }

    /// The clip rect in raster pixels, clamped to the raster and snapped to
    /// whole pixels. `None` for the overlay or when nothing is left to crop.
    pub fn crop_rect(&self) -> Option<ClipRect> {
        let raster = self.raster?;
        raster.crop_rect(&self.rect()?)
    }

    pub fn snapshot(&self, event: EventKind) -> StateSnapshot {
        StateSnapshot {
            event,
            mode: self.mode(),
            shape: self.state.shape,
            geo_corners: self.geo,
        }
    }

    /// Width / height lock for create and resize. Only the overlay locks,
    /// and only once a raster with a usable size is loaded.
    fn aspect_ratio(&self) -> Option<f64> {
        match self.variant {
            EditorVariant::Overlay => self.raster.and_then(|r| r.aspect_ratio()),
            EditorVariant::Clipper => None,
        }
    }

    fn tool_context(&self) -> ToolContext {
        ToolContext {
            shape_kind: self.variant.shape_kind(),
            aspect_ratio: self.aspect_ratio(),
        }
    }

    fn hit_context(&self, pointer: Point) -> HitContext {
        let limit = match self.variant {
            EditorVariant::Clipper => self.raster.map(|r| r.bounds()),
            EditorVariant::Overlay => None,
        };
        HitContext {
            shape: self.state.shape,
            pointer,
            radius: scaled_hit_radius(self.config.hit_radius, self.nav.scale()),
            rotate_zone: self.config.rotate_zone,
            limit,
        }
    }

    fn is_locked(&self) -> bool {
        self.pointer_down || self.state.is_locked()
    }

    fn screen_point(&self, coords: &PointerCoords) -> Point {
        event_to_screen_point(coords, &self.canvas)
    }

    fn world_point(&self, coords: &PointerCoords) -> Point {
        screen_to_world(self.screen_point(coords), self.nav.offset(), self.nav.scale())
    }

    /// Handle under a pointer event, for cursor previews outside a gesture.
    pub fn detect_handle(&self, coords: &PointerCoords) -> HandleType {
        let world = self.world_point(coords);
        self.tools.detect_handle(&self.hit_context(world))
    }

    /// CSS cursor for the current pointer state.
    pub fn cursor(&self) -> &'static str {
        if self.pan_from.is_some() {
            return "grabbing";
        }
        if self.is_locked() {
            return cursor_for(self.tools.active());
        }
        if self.tools.pan_mode() {
            return "grab";
        }
        cursor_for(self.tools.candidate())
    }

    // ─── Canvas and raster ───────────────────────────────────────────────

    pub fn set_canvas(&mut self, canvas: CanvasGeometry) {
        self.canvas = canvas;
    }

    /// Resize the backing store to `css * dpr`, keeping the client origin.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        self.canvas = CanvasGeometry::new(css_width, css_height, dpr)
            .with_origin(self.canvas.left, self.canvas.top);
    }

    /// Accept the outcome of an asynchronous raster load.
    ///
    /// A failed or nonsensical load leaves every piece of state untouched so
    /// the caller can retry.
    pub fn set_raster(&mut self, loaded: Result<RasterSize, String>) -> Result<(), String> {
        let size = loaded.map_err(|e| {
            log::warn!("raster load failed: {e}");
            e
        })?;
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width < 0.0
            || size.height < 0.0
        {
            let msg = format!("invalid raster size {}x{}", size.width, size.height);
            log::warn!("{msg}");
            return Err(msg);
        }
        if size.aspect_ratio().is_none() {
            log::warn!(
                "raster {}x{} has no usable aspect ratio; creation is freeform",
                size.width,
                size.height
            );
        }
        self.raster = Some(size);
        Ok(())
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Route a normalized input event. Returns the notification fired, if any.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<EventKind> {
        match event {
            InputEvent::PointerDown { coords } => self.pointer_down(coords),
            InputEvent::PointerMove { coords } => self.pointer_move(coords),
            InputEvent::PointerUp { coords } => self.pointer_up(coords),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::Wheel {
                coords,
                delta,
                mode,
                modifiers,
            } => {
                self.wheel(coords, *delta, *mode, *modifiers);
                None
            }
            InputEvent::KeyDown { code } => {
                self.key_down(code);
                None
            }
            InputEvent::KeyUp { code } => {
                self.key_up(code);
                None
            }
        }
    }

    pub fn pointer_down(&mut self, coords: &PointerCoords) -> Option<EventKind> {
        if !self.is_loaded() {
            return None;
        }
        let screen = self.screen_point(coords);
        let world = self.world_point(coords);
        if !self.is_locked() {
            let ctx = self.hit_context(world);
            self.tools.update(&ctx, false);
        }
        self.pointer_down = true;
        let tool = self.tools.active();
        log::debug!("gesture lock: {tool:?}");
        if tool == ToolKind::None {
            self.pan_from = Some(screen);
            return None;
        }
        let ctx = self.tool_context();
        dispatch(tool, Gesture::Start(world), &mut self.state, &ctx)
    }

    pub fn pointer_move(&mut self, coords: &PointerCoords) -> Option<EventKind> {
        if !self.is_loaded() {
            return None;
        }
        let screen = self.screen_point(coords);
        if let Some(from) = self.pan_from {
            self.nav.pan_by(screen - from);
            self.pan_from = Some(screen);
            return None;
        }
        let world = self.world_point(coords);
        let locked = self.is_locked();
        let ctx = self.hit_context(world);
        self.tools.update(&ctx, locked);
        if !self.pointer_down {
            return None;
        }
        let ctx = self.tool_context();
        dispatch(self.tools.active(), Gesture::Drag(world), &mut self.state, &ctx)
    }

    pub fn pointer_up(&mut self, coords: &PointerCoords) -> Option<EventKind> {
        let fired = self.finish_gesture();
        if self.is_loaded() {
            let world = self.world_point(coords);
            let ctx = self.hit_context(world);
            self.tools.update(&ctx, false);
        }
        fired
    }

    /// Leaving the canvas ends the gesture exactly like a pointer-up.
    pub fn pointer_leave(&mut self) -> Option<EventKind> {
        self.finish_gesture()
    }

    fn finish_gesture(&mut self) -> Option<EventKind> {
        if !self.pointer_down {
            return None;
        }
        self.pointer_down = false;
        if self.pan_from.take().is_some() {
            return None;
        }
        let was_mode = self.mode();
        let ctx = self.tool_context();
        let fired = dispatch(self.tools.active(), Gesture::End, &mut self.state, &ctx);
        // Nothing may stay locked once the pointer is released.
        self.state.clear_gesture();
        log::debug!("gesture unlock: {fired:?}");
        if let Some(kind) = fired {
            // The shape left the position the cached lng/lat describe.
            self.geo = None;
            self.emit(kind);
        }
        self.emit_mode_change(was_mode);
        fired
    }

    // ─── Wheel and keys ──────────────────────────────────────────────────

    /// Ctrl+wheel zooms about the pointer; a plain wheel pans.
    pub fn wheel(&mut self, coords: &PointerCoords, delta: Vec2, mode: DeltaMode, modifiers: Modifiers) {
        if !self.is_loaded() {
            return;
        }
        let anchor = self.screen_point(coords);
        self.nav.apply_wheel(anchor, delta, mode, modifiers.ctrl);
    }

    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, code: &str) -> bool {
        if code != PAN_KEY {
            return false;
        }
        if !self.tools.pan_mode() {
            log::debug!("pan mode on");
            self.tools.set_pan_mode(true, self.is_locked());
        }
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        if code != PAN_KEY {
            return false;
        }
        log::debug!("pan mode off");
        self.tools.set_pan_mode(false, self.is_locked());
        true
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    pub fn set_scale(&mut self, scale: f64) {
        self.nav.set_scale(scale);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.nav.pan_by(delta);
    }

    pub fn zoom_about(&mut self, screen: Point, factor: f64) {
        self.nav.zoom_about(screen, factor);
    }

    pub fn reset_view(&mut self) {
        self.nav.reset();
    }

    // ─── Shape setters ───────────────────────────────────────────────────

    /// Install a shape directly. The shape must match the editor variant.
    /// Cached geo corners are dropped since they no longer describe it.
    pub fn set_shape(&mut self, shape: Shape) -> Result<(), String> {
        self.install_shape(shape, None)
    }

    /// Validate, store `shape` and `geo` together, then notify.
    fn install_shape(&mut self, shape: Shape, geo: Option<GeoCorners>) -> Result<(), String> {
        if shape.kind() != self.variant.shape_kind() {
            return Err(format!(
                "{:?} editor cannot hold a {:?} shape",
                self.variant,
                shape.kind()
            ));
        }
        if !shape.to_quad().is_finite() {
            return Err("shape has non-finite coordinates".to_string());
        }
        let was_mode = self.mode();
        self.state.clear_gesture();
        self.state.shape = Some(shape);
        self.geo = geo;
        self.emit(EventKind::TransformChanged);
        self.emit_mode_change(was_mode);
        Ok(())
    }

    /// Set the shape from four corners. Clippers take their bounding box.
    pub fn set_corners(&mut self, quad: Quad) -> Result<(), String> {
        self.set_shape(self.shape_from_quad(quad))
    }

    fn shape_from_quad(&self, quad: Quad) -> Shape {
        match self.variant {
            EditorVariant::Clipper => Shape::Rect(quad.bounding_rect()),
            EditorVariant::Overlay => Shape::Quad(quad),
        }
    }

    /// Seed a known placement (e.g. one loaded from storage) without
    /// reporting it as newly created.
    pub fn initialize_with_corners(
        &mut self,
        quad: Quad,
        geo: Option<GeoCorners>,
    ) -> Result<(), String> {
        if !quad.is_finite() {
            return Err("corners have non-finite coordinates".to_string());
        }
        let was_mode = self.mode();
        self.state.reset();
        self.state.shape = Some(self.shape_from_quad(quad));
        self.geo = geo;
        self.emit_mode_change(was_mode);
        Ok(())
    }

    /// Edit `quad` in screen space: navigation is saved and reset to
    /// identity until [`Editor::end_transform_session`].
    pub fn begin_transform_session(&mut self, quad: Quad) -> Result<(), String> {
        if self.saved_nav.is_none() {
            self.saved_nav = Some(self.nav);
        }
        self.nav.reset();
        self.initialize_with_corners(quad, self.geo)
    }

    /// Clear the shape and restore the navigation saved at session start.
    /// Returns the corners as they were when the session ended.
    pub fn end_transform_session(&mut self) -> Option<Quad> {
        let corners = self.corners();
        let was_mode = self.mode();
        self.state.reset();
        self.pointer_down = false;
        self.pan_from = None;
        if let Some(saved) = self.saved_nav.take() {
            self.nav = saved;
        }
        self.emit_mode_change(was_mode);
        corners
    }

    pub fn in_transform_session(&self) -> bool {
        self.saved_nav.is_some()
    }

    /// Back to create mode. Listeners and the loaded raster survive.
    pub fn reset(&mut self) {
        let was_mode = self.mode();
        self.state.reset();
        self.tools.reset();
        self.geo = None;
        self.pointer_down = false;
        self.pan_from = None;
        self.emit_mode_change(was_mode);
    }

    // ─── Geo ─────────────────────────────────────────────────────────────

    /// Project the current corners to lng/lat and remember the result.
    pub fn geo_corners(&mut self, projection: &impl GeoProjection) -> Result<GeoCorners, String> {
        let quad = self.corners().ok_or("no shape to project")?;
        let geo = GeoCorners::from_quad(&quad, projection)?;
        self.geo = Some(geo);
        Ok(geo)
    }

    /// Place the shape from lng/lat corners.
    pub fn set_geo_corners(
        &mut self,
        geo: &GeoCorners,
        projection: &impl GeoProjection,
    ) -> Result<(), String> {
        let quad = geo.to_quad(projection)?;
        self.install_shape(self.shape_from_quad(quad), Some(*geo))
    }

    pub fn cached_geo_corners(&self) -> Option<&GeoCorners> {
        self.geo.as_ref()
    }

    /// Hit test in lng/lat against the last known geo corners.
    pub fn detect_geo_handle(&self, point: GeoPoint) -> HandleType {
        match &self.geo {
            Some(corners) => detect_geo_handle(point, corners),
            None => HandleType::None,
        }
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    pub fn add_listener(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.add(kind, listener);
    }

    pub fn remove_listener(&mut self, kind: EventKind, listener: &Listener) -> bool {
        self.listeners.remove(kind, listener)
    }

    pub fn clear_listeners(&mut self, kind: EventKind) {
        self.listeners.clear(kind);
    }

    fn emit(&self, kind: EventKind) {
        self.listeners.emit(&self.snapshot(kind));
    }

    fn emit_mode_change(&self, was: EditorMode) {
        if self.mode() != was {
            log::debug!("mode: {was:?} -> {:?}", self.mode());
            self.emit(EventKind::ModeChanged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mouse(x: f64, y: f64) -> PointerCoords {
        PointerCoords::mouse(x, y)
    }

    fn loaded(variant: EditorVariant) -> Editor {
        let mut editor = Editor::new(variant, EditorConfig::default());
        editor.set_canvas(CanvasGeometry::new(800.0, 600.0, 1.0));
        editor.set_raster(Ok(RasterSize::new(400.0, 200.0))).unwrap();
        editor
    }

    #[test]
    fn pointer_ignored_until_loaded() {
        let mut editor = Editor::overlay();
        editor.pointer_down(&mouse(10.0, 10.0));
        editor.pointer_move(&mouse(50.0, 50.0));
        editor.pointer_up(&mouse(50.0, 50.0));
        assert_eq!(editor.shape(), None);
        assert_eq!(editor.mode(), EditorMode::Create);
    }

    #[test]
    fn rejected_raster_leaves_state() {
        let mut editor = loaded(EditorVariant::Overlay);
        assert!(editor.set_raster(Err("decode failed".to_string())).is_err());
        assert!(editor.set_raster(Ok(RasterSize::new(f64::NAN, 1.0))).is_err());
        assert_eq!(editor.raster(), Some(RasterSize::new(400.0, 200.0)));
    }

    #[test]
    fn cursor_follows_candidate() {
        let mut editor = loaded(EditorVariant::Clipper);
        editor.pointer_move(&mouse(10.0, 10.0));
        assert_eq!(editor.cursor(), "crosshair");
        // Off the raster, the clipper offers nothing.
        editor.pointer_move(&mouse(500.0, 10.0));
        assert_eq!(editor.cursor(), "grab");

        editor.set_shape(Shape::Rect(ClipRect::new(Point::ZERO, 100.0, 100.0))).unwrap();
        editor.pointer_move(&mouse(100.0, 0.0));
        assert_eq!(editor.cursor(), "nesw-resize");
        editor.pointer_move(&mouse(100.0, 50.0));
        assert_eq!(editor.cursor(), "ew-resize");
        editor.pointer_move(&mouse(50.0, 50.0));
        assert_eq!(editor.cursor(), "move");
    }

    #[test]
    fn space_forces_grab() {
        let mut editor = loaded(EditorVariant::Overlay);
        editor.pointer_move(&mouse(10.0, 10.0));
        assert!(editor.key_down("Space"));
        assert_eq!(editor.cursor(), "grab");
        assert_eq!(editor.tools().active(), ToolKind::None);
        assert!(!editor.key_down("KeyA"));

        editor.pointer_down(&mouse(10.0, 10.0));
        assert_eq!(editor.cursor(), "grabbing");
        editor.pointer_move(&mouse(30.0, 25.0));
        editor.pointer_up(&mouse(30.0, 25.0));
        assert_eq!(editor.navigation().offset(), Vec2::new(20.0, 15.0));
        assert_eq!(editor.shape(), None);

        editor.key_up("Space");
        editor.pointer_move(&mouse(10.0, 10.0));
        assert_eq!(editor.cursor(), "crosshair");
    }

    #[test]
    fn crop_rect_is_clamped_to_raster() {
        let mut editor = loaded(EditorVariant::Clipper);
        assert_eq!(editor.crop_rect(), None);
        editor
            .set_shape(Shape::Rect(ClipRect::new(Point::new(350.4, -10.0), 100.0, 60.6)))
            .unwrap();
        assert_eq!(
            editor.crop_rect(),
            Some(ClipRect::new(Point::new(350.0, 0.0), 50.0, 51.0))
        );

        let mut overlay = loaded(EditorVariant::Overlay);
        overlay
            .initialize_with_corners(ClipRect::new(Point::ZERO, 50.0, 50.0).to_quad(), None)
            .unwrap();
        assert_eq!(overlay.crop_rect(), None);
    }

    #[test]
    fn set_shape_rejects_wrong_variant() {
        let mut editor = Editor::clipper();
        let quad = Shape::Quad(Quad::at(Point::ZERO));
        assert!(editor.set_shape(quad).is_err());
        assert_eq!(editor.shape(), None);
    }

    #[test]
    fn clipper_corners_become_bounding_rect() {
        let mut editor = Editor::clipper();
        let quad = Quad::new(
            Point::new(0.0, 5.0),
            Point::new(10.0, 0.0),
            Point::new(2.0, 20.0),
            Point::new(12.0, 15.0),
        );
        editor.initialize_with_corners(quad, None).unwrap();
        assert_eq!(editor.rect(), Some(ClipRect::new(Point::ZERO, 12.0, 20.0)));
        assert_eq!(editor.mode(), EditorMode::Edit);
    }
}
