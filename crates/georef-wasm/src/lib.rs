//! WASM bridge for the georeferencing editors.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM and
//! the map; everything geometric goes through [`GeorefCanvas`].

mod render2d;

use georef_core::{
    CanvasGeometry, ClipRect, GeoCorners, GeoPoint, GeoProjection, HandleType, Point,
    PointerCoords, Quad, RasterSize,
};
use georef_editor::{
    DeltaMode, Editor, EditorConfig, EditorVariant, EventKind, Listener, Modifiers, StateSnapshot,
};
use kurbo::Vec2;
use render2d::{FrameTheme, RasterSource};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent, MouseEvent,
    TouchEvent, WheelEvent,
};

/// A JS callback registered for one event kind, kept so it can be removed
/// by function identity.
struct JsListener {
    kind: EventKind,
    callback: js_sys::Function,
    listener: Listener,
}

/// The main WASM-facing editor controller.
///
/// Listeners run synchronously inside the pointer handler that fired them;
/// they receive a JSON snapshot and must not call back into this object.
#[wasm_bindgen]
pub struct GeorefCanvas {
    editor: Editor,
    raster: Option<RasterSource>,
    js_listeners: Vec<JsListener>,
    /// Overlay raster opacity, 0..1.
    opacity: f64,
    theme: FrameTheme,
}

#[wasm_bindgen]
impl GeorefCanvas {
    /// Create an editor. `variant` is `"clipper"` or `"overlay"`;
    /// `config_json` optionally overrides [`EditorConfig`] fields.
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str, config_json: Option<String>) -> Result<GeorefCanvas, JsValue> {
        console_error_panic_hook_setup();
        init_logging();

        let variant = parse_variant(variant).map_err(|e| JsValue::from_str(&e))?;
        let config = match config_json.as_deref() {
            Some(json) => parse_config(json).map_err(|e| JsValue::from_str(&e))?,
            None => EditorConfig::default(),
        };
        log::debug!("new {variant:?} editor: {config:?}");
        Ok(Self {
            editor: Editor::new(variant, config),
            raster: None,
            js_listeners: Vec::new(),
            opacity: 0.6,
            theme: FrameTheme::default(),
        })
    }

    // ─── Canvas and raster ───────────────────────────────────────────────

    /// Set the backing store to `css * dpr` and remember the CSS size.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        self.editor.resize(css_width, css_height, dpr);
    }

    /// Refresh canvas geometry from the element (bounding rect + backing store).
    pub fn sync_canvas(&mut self, canvas: &HtmlCanvasElement) {
        let rect = canvas.get_bounding_client_rect();
        self.editor.set_canvas(CanvasGeometry {
            left: rect.left(),
            top: rect.top(),
            css_width: rect.width(),
            css_height: rect.height(),
            pixel_width: f64::from(canvas.width()),
            pixel_height: f64::from(canvas.height()),
        });
    }

    /// A decoded image finished loading.
    pub fn set_raster_image(&mut self, image: HtmlImageElement) -> Result<(), JsValue> {
        let size = RasterSize::new(
            f64::from(image.natural_width()),
            f64::from(image.natural_height()),
        );
        self.accept_raster(Ok(size), RasterSource::Image(image))
    }

    /// A PDF page finished rendering into `canvas`.
    pub fn set_raster_canvas(&mut self, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let size = RasterSize::new(f64::from(canvas.width()), f64::from(canvas.height()));
        self.accept_raster(Ok(size), RasterSource::Canvas(canvas))
    }

    /// Size-only raster (no blit source), for hosts that draw the raster
    /// themselves.
    pub fn set_raster_size(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.editor
            .set_raster(Ok(RasterSize::new(width, height)))
            .map_err(|e| JsValue::from_str(&e))
    }

    /// The raster load was rejected. Editor state is left untouched.
    pub fn raster_failed(&mut self, message: &str) -> JsValue {
        let err = self
            .editor
            .set_raster(Err(message.to_string()))
            .err()
            .unwrap_or_default();
        JsValue::from_str(&err)
    }

    pub fn is_loaded(&self) -> bool {
        self.editor.is_loaded()
    }

    pub fn is_initialized(&self) -> bool {
        self.editor.is_initialized()
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Draw the current frame.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        render2d::render(
            ctx,
            &self.editor,
            self.raster.as_ref(),
            self.opacity,
            &self.theme,
        )
    }

    // ─── Pointer input (client coordinates) ──────────────────────────────

    /// Returns `{"event":..,"cursor":..,"mode":..}`.
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) -> String {
        let fired = self.editor.pointer_down(&PointerCoords::mouse(client_x, client_y));
        self.response(fired)
    }

    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) -> String {
        let fired = self.editor.pointer_move(&PointerCoords::mouse(client_x, client_y));
        self.response(fired)
    }

    pub fn pointer_up(&mut self, client_x: f64, client_y: f64) -> String {
        let fired = self.editor.pointer_up(&PointerCoords::mouse(client_x, client_y));
        self.response(fired)
    }

    pub fn pointer_leave(&mut self) -> String {
        let fired = self.editor.pointer_leave();
        self.response(fired)
    }

    /// Ctrl+wheel zooms about the pointer, otherwise the view pans.
    pub fn wheel(
        &mut self,
        client_x: f64,
        client_y: f64,
        delta_x: f64,
        delta_y: f64,
        delta_mode: u32,
        ctrl: bool,
    ) {
        let modifiers = Modifiers {
            ctrl,
            ..Modifiers::NONE
        };
        self.editor.wheel(
            &PointerCoords::mouse(client_x, client_y),
            Vec2::new(delta_x, delta_y),
            DeltaMode::from_dom(delta_mode),
            modifiers,
        );
    }

    pub fn key_down(&mut self, code: &str) -> bool {
        self.editor.key_down(code)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.editor.key_up(code)
    }

    // ─── DOM event adapters ──────────────────────────────────────────────

    /// `mousedown` / `mousemove` / `mouseup` / `mouseleave`.
    pub fn handle_mouse_event(&mut self, event: &MouseEvent, canvas: &HtmlCanvasElement) -> String {
        self.sync_canvas(canvas);
        let coords = PointerCoords::mouse(f64::from(event.client_x()), f64::from(event.client_y()));
        let fired = match event.type_().as_str() {
            "mousedown" => self.editor.pointer_down(&coords),
            "mousemove" => self.editor.pointer_move(&coords),
            "mouseup" => self.editor.pointer_up(&coords),
            "mouseleave" => self.editor.pointer_leave(),
            other => {
                log::trace!("ignored mouse event {other}");
                None
            }
        };
        self.response(fired)
    }

    /// `touchstart` / `touchmove` / `touchend` / `touchcancel`.
    pub fn handle_touch_event(&mut self, event: &TouchEvent, canvas: &HtmlCanvasElement) -> String {
        self.sync_canvas(canvas);
        let kind = event.type_();
        // A lifted finger is no longer in `touches`, only in `changedTouches`.
        let list = if kind == "touchend" || kind == "touchcancel" {
            event.changed_touches()
        } else {
            event.touches()
        };
        let coords = PointerCoords::touch(
            (0..list.length())
                .filter_map(|i| list.get(i))
                .map(|t| Point::new(f64::from(t.client_x()), f64::from(t.client_y()))),
        );
        let fired = match kind.as_str() {
            "touchstart" => self.editor.pointer_down(&coords),
            "touchmove" => self.editor.pointer_move(&coords),
            "touchend" => self.editor.pointer_up(&coords),
            "touchcancel" => self.editor.pointer_leave(),
            _ => None,
        };
        self.response(fired)
    }

    /// Ctrl+wheel suppresses the browser's page zoom.
    pub fn handle_wheel_event(&mut self, event: &WheelEvent, canvas: &HtmlCanvasElement) {
        self.sync_canvas(canvas);
        if event.ctrl_key() {
            event.prevent_default();
        }
        self.wheel(
            f64::from(event.client_x()),
            f64::from(event.client_y()),
            event.delta_x(),
            event.delta_y(),
            event.delta_mode(),
            event.ctrl_key(),
        );
    }

    /// `keydown` / `keyup`. Returns whether the key was consumed.
    pub fn handle_key_event(&mut self, event: &KeyboardEvent) -> bool {
        let code = event.code();
        let consumed = match event.type_().as_str() {
            "keydown" => self.editor.key_down(&code),
            "keyup" => self.editor.key_up(&code),
            _ => false,
        };
        if consumed {
            event.prevent_default();
        }
        consumed
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn cursor(&self) -> String {
        self.editor.cursor().to_string()
    }

    pub fn mode(&self) -> String {
        to_json(&self.editor.mode()).trim_matches('"').to_string()
    }

    /// Handle under a client point, as `"TOP_LEFT"`, `"BODY"`, ... or `"NONE"`.
    pub fn detect_handle(&self, client_x: f64, client_y: f64) -> String {
        handle_name(
            self.editor
                .detect_handle(&PointerCoords::mouse(client_x, client_y)),
        )
    }

    /// `{"scale":..,"offset":{"x":..,"y":..},...}`
    pub fn navigation_json(&self) -> String {
        to_json(self.editor.navigation())
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.editor.set_scale(scale);
    }

    pub fn reset_view(&mut self) {
        self.editor.reset_view();
    }

    /// The shape as `{"kind":"rect",...}` / `{"kind":"quad",...}`, or `null`.
    pub fn shape_json(&self) -> String {
        to_json(&self.editor.shape())
    }

    // ─── Corners ─────────────────────────────────────────────────────────

    /// `{"corner1":{"x":..,"y":..},...,"corner4":..}` or `null`.
    pub fn corners_json(&self) -> String {
        to_json(&self.editor.corners())
    }

    pub fn set_corners_json(&mut self, json: &str) -> Result<(), JsValue> {
        let quad = parse_quad(json).map_err(|e| JsValue::from_str(&e))?;
        self.editor.set_corners(quad).map_err(|e| JsValue::from_str(&e))
    }

    /// Seed known corners, and optionally their geo equivalents, without
    /// firing `boundsCreated`.
    pub fn initialize_with_corners(
        &mut self,
        corners_json: &str,
        geo_json: Option<String>,
    ) -> Result<(), JsValue> {
        let quad = parse_quad(corners_json).map_err(|e| JsValue::from_str(&e))?;
        let geo = geo_json
            .as_deref()
            .map(parse_geo_corners)
            .transpose()
            .map_err(|e| JsValue::from_str(&e))?;
        self.editor
            .initialize_with_corners(quad, geo)
            .map_err(|e| JsValue::from_str(&e))
    }

    pub fn begin_transform_session(&mut self, corners_json: &str) -> Result<(), JsValue> {
        let quad = parse_quad(corners_json).map_err(|e| JsValue::from_str(&e))?;
        self.editor
            .begin_transform_session(quad)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Returns the final corners JSON (or `null`).
    pub fn end_transform_session(&mut self) -> String {
        to_json(&self.editor.end_transform_session())
    }

    pub fn reset(&mut self) {
        self.editor.reset();
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Render the clipped part of the raster into an offscreen canvas.
    ///
    /// `format` is `"png"` (default) or `"jpeg"`; `quality` (0..1, default
    /// 0.95) only matters for jpeg. Returns
    /// `{"dataUrl":..,"width":..,"height":..,"clipRect":{..}}`, or `null`
    /// when there is no raster source or clip rect.
    pub fn export_clip(&self, format: Option<String>, quality: Option<f64>) -> Result<String, JsValue> {
        let mime = export_mime(format.as_deref()).map_err(|e| JsValue::from_str(&e))?;
        let (Some(source), Some(crop)) = (self.raster.as_ref(), self.editor.crop_rect()) else {
            log::warn!("nothing to export: no raster or clip rect");
            return Ok("null".to_string());
        };

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(crop.width as u32);
        canvas.set_height(crop.height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        source.draw_region(&ctx, &crop)?;

        let url = canvas.to_data_url_with_type_and_encoder_options(
            mime,
            &JsValue::from_f64(export_quality(quality)),
        )?;
        log::debug!("exported {}x{} clip as {mime}", crop.width, crop.height);
        Ok(export_json(&url, &crop))
    }

    // ─── Geo ─────────────────────────────────────────────────────────────

    /// Project the corners with the map's `project([x, y]) -> [lng, lat]`.
    /// Returns `{"topLeft":{"lng":..,"lat":..},...}`.
    pub fn geo_corners_json(
        &mut self,
        project: js_sys::Function,
        unproject: js_sys::Function,
    ) -> Result<String, JsValue> {
        let projection = JsProjection { project, unproject };
        let geo = self
            .editor
            .geo_corners(&projection)
            .map_err(|e| JsValue::from_str(&e))?;
        Ok(to_json(&geo))
    }

    pub fn set_geo_corners_json(
        &mut self,
        json: &str,
        project: js_sys::Function,
        unproject: js_sys::Function,
    ) -> Result<(), JsValue> {
        let geo = parse_geo_corners(json).map_err(|e| JsValue::from_str(&e))?;
        let projection = JsProjection { project, unproject };
        self.editor
            .set_geo_corners(&geo, &projection)
            .map_err(|e| JsValue::from_str(&e))
    }

    pub fn detect_geo_handle(&self, lng: f64, lat: f64) -> String {
        handle_name(self.editor.detect_geo_handle(GeoPoint::new(lng, lat)))
    }

    // ─── Listeners ───────────────────────────────────────────────────────

    /// Register `callback(snapshotJson)` for `"boundsCreated"`,
    /// `"transformChanged"` or `"modeChanged"`.
    pub fn add_listener(&mut self, event: &str, callback: js_sys::Function) -> Result<(), JsValue> {
        let kind = parse_event(event).map_err(|e| JsValue::from_str(&e))?;
        let target = callback.clone();
        let listener: Listener = Rc::new(move |snapshot: &StateSnapshot| {
            let json = to_json(snapshot);
            if let Err(e) = target.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("listener for {} threw: {e:?}", snapshot.event.name());
            }
        });
        self.editor.add_listener(kind, listener.clone());
        self.js_listeners.push(JsListener {
            kind,
            callback,
            listener,
        });
        Ok(())
    }

    /// Remove a callback previously passed to `add_listener`.
    pub fn remove_listener(&mut self, event: &str, callback: &js_sys::Function) -> bool {
        let Ok(kind) = parse_event(event) else {
            return false;
        };
        let target: &JsValue = callback.as_ref();
        let Some(i) = self
            .js_listeners
            .iter()
            .position(|l| l.kind == kind && AsRef::<JsValue>::as_ref(&l.callback) == target)
        else {
            return false;
        };
        let entry = self.js_listeners.remove(i);
        self.editor.remove_listener(kind, &entry.listener)
    }

    pub fn clear_listeners(&mut self, event: &str) -> Result<(), JsValue> {
        let kind = parse_event(event).map_err(|e| JsValue::from_str(&e))?;
        self.editor.clear_listeners(kind);
        self.js_listeners.retain(|l| l.kind != kind);
        Ok(())
    }
}

impl GeorefCanvas {
    fn accept_raster(&mut self, size: Result<RasterSize, String>, source: RasterSource) -> Result<(), JsValue> {
        self.editor.set_raster(size).map_err(|e| JsValue::from_str(&e))?;
        self.raster = Some(source);
        Ok(())
    }

    fn response(&self, fired: Option<EventKind>) -> String {
        response_json(fired, self.editor.cursor(), &self.editor.mode())
    }
}

// ─── Geo projection through JS ───────────────────────────────────────────

/// Wraps the map's `project` / `unproject` callbacks. Both take and return
/// two-element arrays.
struct JsProjection {
    project: js_sys::Function,
    unproject: js_sys::Function,
}

fn call_pair(f: &js_sys::Function, a: f64, b: f64) -> Result<(f64, f64), String> {
    let arg = js_sys::Array::of2(&JsValue::from_f64(a), &JsValue::from_f64(b));
    let out = f
        .call1(&JsValue::NULL, &arg)
        .map_err(|e| format!("projection threw: {e:?}"))?;
    let pair = js_sys::Array::from(&out);
    match (pair.get(0).as_f64(), pair.get(1).as_f64()) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok((x, y)),
        _ => Err("projection did not return two finite numbers".to_string()),
    }
}

impl GeoProjection for JsProjection {
    fn project(&self, world: Point) -> Result<GeoPoint, String> {
        let (lng, lat) = call_pair(&self.project, world.x, world.y)?;
        Ok(GeoPoint::new(lng, lat))
    }

    fn unproject(&self, geo: GeoPoint) -> Result<Point, String> {
        let (x, y) = call_pair(&self.unproject, geo.lng, geo.lat)?;
        Ok(Point::new(x, y))
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn parse_variant(name: &str) -> Result<EditorVariant, String> {
    match name {
        "clipper" => Ok(EditorVariant::Clipper),
        "overlay" => Ok(EditorVariant::Overlay),
        other => Err(format!("unknown editor variant: {other}")),
    }
}

fn parse_event(name: &str) -> Result<EventKind, String> {
    EventKind::from_name(name).ok_or_else(|| format!("unknown event: {name}"))
}

fn parse_config(json: &str) -> Result<EditorConfig, String> {
    serde_json::from_str(json).map_err(|e| {
        log::warn!("bad editor config: {e}");
        format!("invalid config: {e}")
    })
}

fn parse_quad(json: &str) -> Result<Quad, String> {
    serde_json::from_str(json).map_err(|e| {
        log::warn!("malformed corners JSON: {e}");
        format!("invalid corners: {e}")
    })
}

fn parse_geo_corners(json: &str) -> Result<GeoCorners, String> {
    serde_json::from_str(json).map_err(|e| {
        log::warn!("malformed geo corners JSON: {e}");
        format!("invalid geo corners: {e}")
    })
}

fn handle_name(handle: HandleType) -> String {
    to_json(&handle).trim_matches('"').to_string()
}

fn export_mime(format: Option<&str>) -> Result<&'static str, String> {
    match format {
        None | Some("png") => Ok("image/png"),
        Some("jpeg" | "jpg") => Ok("image/jpeg"),
        Some(other) => Err(format!("unsupported export format: {other}")),
    }
}

fn export_quality(quality: Option<f64>) -> f64 {
    match quality {
        Some(q) if q.is_finite() => q.clamp(0.0, 1.0),
        _ => 0.95,
    }
}

fn export_json(data_url: &str, crop: &ClipRect) -> String {
    serde_json::json!({
        "dataUrl": data_url,
        "width": crop.width,
        "height": crop.height,
        "clipRect": {
            "x": crop.offset.x,
            "y": crop.offset.y,
            "width": crop.width,
            "height": crop.height,
        },
    })
    .to_string()
}

fn response_json<M: serde::Serialize>(fired: Option<EventKind>, cursor: &str, mode: &M) -> String {
    serde_json::json!({
        "event": fired,
        "cursor": cursor,
        "mode": mode,
    })
    .to_string()
}

/// Route `log` output to the browser console.
fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            if console_log::init_with_level(log::Level::Debug).is_err() {
                web_sys::console::warn_1(&"georef: logger already set".into());
            }
        });
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("georef WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
