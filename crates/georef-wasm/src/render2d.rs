//! Canvas2D draw pass for both editor variants.
//!
//! The clipper draws the raster under the navigation transform, dims
//! everything outside the crop rect, then frames it. The overlay warps the
//! raster into the quad (affine, from TL/TR/BL) at the chosen opacity and
//! frames the quad. Handles are always drawn in screen space so they keep a
//! constant size at any zoom.

use georef_core::{ClipRect, HandleType, Point, Quad, Shape};
use georef_editor::{Editor, EditorVariant};
use kurbo::Affine;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Anything Canvas2D can blit: a decoded image or a rendered PDF page.
pub enum RasterSource {
    Image(HtmlImageElement),
    Canvas(HtmlCanvasElement),
}

impl RasterSource {
    fn draw(&self, ctx: &CanvasRenderingContext2d, w: f64, h: f64) -> Result<(), JsValue> {
        match self {
            Self::Image(img) => ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, w, h),
            Self::Canvas(c) => ctx.draw_image_with_html_canvas_element_and_dw_and_dh(c, 0.0, 0.0, w, h),
        }
    }

    /// Copy `crop` (raster pixels) to the origin of `ctx` at 1:1.
    pub fn draw_region(&self, ctx: &CanvasRenderingContext2d, crop: &ClipRect) -> Result<(), JsValue> {
        let (x, y, w, h) = (crop.offset.x, crop.offset.y, crop.width, crop.height);
        match self {
            Self::Image(img) => ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    img, x, y, w, h, 0.0, 0.0, w, h,
                ),
            Self::Canvas(c) => ctx
                .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    c, x, y, w, h, 0.0, 0.0, w, h,
                ),
        }
    }
}

/// Colors and sizes for the editing chrome.
pub struct FrameTheme {
    pub frame: &'static str,
    pub handle_fill: &'static str,
    pub handle_stroke: &'static str,
    pub mask: &'static str,
    pub handle_size: f64,
}

impl Default for FrameTheme {
    fn default() -> Self {
        Self {
            frame: "#4FC3F7",
            handle_fill: "#FFFFFF",
            handle_stroke: "#4FC3F7",
            mask: "rgba(0, 0, 0, 0.45)",
            handle_size: 8.0,
        }
    }
}

fn set_affine(ctx: &CanvasRenderingContext2d, t: Affine) -> Result<(), JsValue> {
    let [a, b, c, d, e, f] = t.as_coeffs();
    ctx.set_transform(a, b, c, d, e, f)
}

/// World → screen as an affine map.
fn view_affine(editor: &Editor) -> Affine {
    let nav = editor.navigation();
    Affine::translate(nav.offset()) * Affine::scale(nav.scale())
}

/// Maps raster pixels `[0, w] × [0, h]` onto the quad's TL/TR/BL frame.
fn quad_affine(quad: &Quad, w: f64, h: f64) -> Affine {
    let x_axis = (quad.top_right - quad.top_left) / w;
    let y_axis = (quad.bottom_left - quad.top_left) / h;
    Affine::new([
        x_axis.x,
        x_axis.y,
        y_axis.x,
        y_axis.y,
        quad.top_left.x,
        quad.top_left.y,
    ])
}

/// Draw one frame.
pub fn render(
    ctx: &CanvasRenderingContext2d,
    editor: &Editor,
    raster: Option<&RasterSource>,
    opacity: f64,
    theme: &FrameTheme,
) -> Result<(), JsValue> {
    let canvas = editor.canvas();
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, canvas.pixel_width, canvas.pixel_height);

    let size = editor.raster().filter(|r| r.width > 0.0 && r.height > 0.0);
    match editor.variant() {
        EditorVariant::Clipper => {
            if let (Some(src), Some(size)) = (raster, size) {
                ctx.save();
                set_affine(ctx, view_affine(editor))?;
                src.draw(ctx, size.width, size.height)?;
                ctx.restore();
            }
            if let Some(Shape::Rect(rect)) = editor.shape() {
                let view = view_affine(editor);
                let min = view * Point::new(rect.min_x(), rect.min_y());
                let max = view * Point::new(rect.max_x(), rect.max_y());
                draw_mask(ctx, min, max, canvas.pixel_width, canvas.pixel_height, theme);
                draw_frame(ctx, editor, theme);
            }
        }
        EditorVariant::Overlay => {
            if let (Some(src), Some(size), Some(Shape::Quad(quad))) =
                (raster, size, editor.shape())
            {
                ctx.save();
                ctx.set_global_alpha(opacity.clamp(0.0, 1.0));
                set_affine(
                    ctx,
                    view_affine(editor) * quad_affine(quad, size.width, size.height),
                )?;
                src.draw(ctx, size.width, size.height)?;
                ctx.restore();
            }
            if editor.shape().is_some() {
                draw_frame(ctx, editor, theme);
            }
        }
    }
    Ok(())
}

/// Dim the four bands around the screen-space rect `min..max`.
fn draw_mask(
    ctx: &CanvasRenderingContext2d,
    min: Point,
    max: Point,
    width: f64,
    height: f64,
    theme: &FrameTheme,
) {
    ctx.set_fill_style_str(theme.mask);
    ctx.fill_rect(0.0, 0.0, width, min.y.max(0.0));
    ctx.fill_rect(0.0, max.y, width, (height - max.y).max(0.0));
    ctx.fill_rect(0.0, min.y, min.x.max(0.0), max.y - min.y);
    ctx.fill_rect(max.x, min.y, (width - max.x).max(0.0), max.y - min.y);
}

fn draw_frame(ctx: &CanvasRenderingContext2d, editor: &Editor, theme: &FrameTheme) {
    let Some(shape) = editor.shape() else {
        return;
    };
    let nav = editor.navigation();
    let outline = shape.to_quad().polygon().map(|p| nav.to_screen(p));

    ctx.save();
    ctx.set_stroke_style_str(theme.frame);
    ctx.set_line_width(1.5);
    ctx.begin_path();
    ctx.move_to(outline[0].x, outline[0].y);
    for p in &outline[1..] {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
    ctx.stroke();

    // No handles while the shape is still being dragged out.
    if !editor.state().is_creating {
        let size = theme.handle_size;
        let half = size / 2.0;
        ctx.set_fill_style_str(theme.handle_fill);
        ctx.set_stroke_style_str(theme.handle_stroke);
        for (handle, at) in shape.handle_points() {
            let p = nav.to_screen(at);
            if handle == editor.state().active_handle && handle != HandleType::None {
                ctx.set_fill_style_str(theme.frame);
                ctx.fill_rect(p.x - half, p.y - half, size, size);
                ctx.set_fill_style_str(theme.handle_fill);
            } else {
                ctx.fill_rect(p.x - half, p.y - half, size, size);
            }
            ctx.stroke_rect(p.x - half, p.y - half, size, size);
        }
    }
    ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_affine_maps_raster_corners() {
        let quad = Quad::new(
            Point::new(10.0, 20.0),
            Point::new(110.0, 40.0),
            Point::new(0.0, 70.0),
            Point::new(100.0, 90.0),
        );
        let t = quad_affine(&quad, 200.0, 100.0);
        assert!((t * Point::ZERO).distance(quad.top_left) < 1e-9);
        assert!((t * Point::new(200.0, 0.0)).distance(quad.top_right) < 1e-9);
        assert!((t * Point::new(0.0, 100.0)).distance(quad.bottom_left) < 1e-9);
        assert!((t * Point::new(200.0, 100.0)).distance(quad.bottom_right) < 1e-9);
    }
}
