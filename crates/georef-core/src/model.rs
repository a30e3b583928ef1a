//! Geometric model for the two editor variants.
//!
//! The clipper editor edits an axis-aligned [`ClipRect`]; the overlay editor
//! edits a free [`Quad`] whose corners are stored in TL, TR, BL, BR order.
//! Both are wrapped by [`Shape`] so the projector, hit tester, and tools can
//! share one code path. Whether a [`Point`] is in screen or world space is
//! decided by the caller, never by the type.

use serde::{Deserialize, Serialize};

pub use kurbo::{Point, Vec2};

// ─── Handles ─────────────────────────────────────────────────────────────

/// A named hot-zone on a shape.
///
/// Hit-testing priority is corner > edge > body > none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandleType {
    #[default]
    None,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Left,
    Right,
    Top,
    Bottom,
    Body,
}

impl HandleType {
    pub const CORNERS: [HandleType; 4] = [
        HandleType::TopLeft,
        HandleType::TopRight,
        HandleType::BottomRight,
        HandleType::BottomLeft,
    ];

    pub const EDGES: [HandleType; 4] = [
        HandleType::Left,
        HandleType::Right,
        HandleType::Top,
        HandleType::Bottom,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }

    pub fn is_edge(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Top | Self::Bottom)
    }

    /// The handle diagonally (or, for edges, directly) across the shape.
    pub fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Body => Self::Body,
            Self::None => Self::None,
        }
    }
}

/// The eight named handle positions of a shape, in hit-test order:
/// corners TL, TR, BR, BL, then edge midpoints L, R, T, B.
pub type HandlePoints = [(HandleType, Point); 8];

// ─── Clip rectangle ──────────────────────────────────────────────────────

/// Axis-aligned rectangle. Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipRect {
    pub offset: Point,
    pub width: f64,
    pub height: f64,
}

impl ClipRect {
    /// Build a rect, reordering the offset so negative extents flip instead
    /// of being stored.
    pub fn new(offset: Point, width: f64, height: f64) -> Self {
        Self::from_points(offset, Point::new(offset.x + width, offset.y + height))
    }

    /// Bounding box of two points.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            offset: Point::new(a.x.min(b.x), a.y.min(b.y)),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.offset.x
    }

    pub fn min_y(&self) -> f64 {
        self.offset.y
    }

    pub fn max_x(&self) -> f64 {
        self.offset.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.offset.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.offset.x + self.width / 2.0,
            self.offset.y + self.height / 2.0,
        )
    }

    /// Inclusive bounds test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            offset: self.offset + delta,
            ..*self
        }
    }

    /// Position of a corner or edge-midpoint handle.
    pub fn handle_point(&self, handle: HandleType) -> Option<Point> {
        let (x0, y0, x1, y1) = (self.min_x(), self.min_y(), self.max_x(), self.max_y());
        let (cx, cy) = (self.center().x, self.center().y);
        match handle {
            HandleType::TopLeft => Some(Point::new(x0, y0)),
            HandleType::TopRight => Some(Point::new(x1, y0)),
            HandleType::BottomLeft => Some(Point::new(x0, y1)),
            HandleType::BottomRight => Some(Point::new(x1, y1)),
            HandleType::Left => Some(Point::new(x0, cy)),
            HandleType::Right => Some(Point::new(x1, cy)),
            HandleType::Top => Some(Point::new(cx, y0)),
            HandleType::Bottom => Some(Point::new(cx, y1)),
            HandleType::Body | HandleType::None => None,
        }
    }

    pub fn to_quad(&self) -> Quad {
        Quad {
            top_left: Point::new(self.min_x(), self.min_y()),
            top_right: Point::new(self.max_x(), self.min_y()),
            bottom_left: Point::new(self.min_x(), self.max_y()),
            bottom_right: Point::new(self.max_x(), self.max_y()),
        }
    }
}

// ─── Quad ────────────────────────────────────────────────────────────────

/// Four independently placed corners.
///
/// Storage order is TL, TR, BL, BR (`corner1..corner4` on the wire). Every
/// transform moves positions only; which field is "top-left" never changes,
/// so edges always connect TL-TR-BR-BL.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quad {
    #[serde(rename = "corner1")]
    pub top_left: Point,
    #[serde(rename = "corner2")]
    pub top_right: Point,
    #[serde(rename = "corner3")]
    pub bottom_left: Point,
    #[serde(rename = "corner4")]
    pub bottom_right: Point,
}

impl Quad {
    pub fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Zero-area quad with every corner at `p`.
    pub fn at(p: Point) -> Self {
        Self::new(p, p, p, p)
    }

    /// Corners in storage order (TL, TR, BL, BR).
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Corners in winding order (TL, TR, BR, BL) for polygon tests and paths.
    pub fn polygon(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Apply `f` to every corner, keeping the storage order.
    pub fn map(&self, mut f: impl FnMut(Point) -> Point) -> Self {
        Self {
            top_left: f(self.top_left),
            top_right: f(self.top_right),
            bottom_left: f(self.bottom_left),
            bottom_right: f(self.bottom_right),
        }
    }

    /// Arithmetic mean of the four corners.
    pub fn centroid(&self) -> Point {
        let sum = self
            .corners()
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
        (sum / 4.0).to_point()
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        self.map(|p| p + delta)
    }

    /// Length of the top edge.
    pub fn width(&self) -> f64 {
        self.top_left.distance(self.top_right)
    }

    /// Length of the left edge.
    pub fn height(&self) -> f64 {
        self.top_left.distance(self.bottom_left)
    }

    /// Angle of the top edge in radians; 0 for an unrotated quad.
    pub fn rotation(&self) -> f64 {
        (self.top_right - self.top_left).atan2()
    }

    pub fn handle_point(&self, handle: HandleType) -> Option<Point> {
        match handle {
            HandleType::TopLeft => Some(self.top_left),
            HandleType::TopRight => Some(self.top_right),
            HandleType::BottomLeft => Some(self.bottom_left),
            HandleType::BottomRight => Some(self.bottom_right),
            HandleType::Left => Some(self.top_left.midpoint(self.bottom_left)),
            HandleType::Right => Some(self.top_right.midpoint(self.bottom_right)),
            HandleType::Top => Some(self.top_left.midpoint(self.top_right)),
            HandleType::Bottom => Some(self.bottom_left.midpoint(self.bottom_right)),
            HandleType::Body | HandleType::None => None,
        }
    }

    /// Axis-aligned bounding box of the corners.
    pub fn bounding_rect(&self) -> ClipRect {
        let [first, rest @ ..] = self.corners();
        let (mut min, mut max) = (first, first);
        for p in rest {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        ClipRect::from_points(min, max)
    }

    /// All six pairwise corner distances, in a fixed order.
    pub fn pairwise_distances(&self) -> [f64; 6] {
        let c = self.corners();
        [
            c[0].distance(c[1]),
            c[0].distance(c[2]),
            c[0].distance(c[3]),
            c[1].distance(c[2]),
            c[1].distance(c[3]),
            c[2].distance(c[3]),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.corners().iter().all(|p| p.is_finite())
    }
}

// ─── Shape ───────────────────────────────────────────────────────────────

/// Which geometric model an editor works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rect,
    Quad,
}

/// The shape under edit: a clip rectangle or a free quad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Shape {
    Rect(ClipRect),
    Quad(Quad),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rect(_) => ShapeKind::Rect,
            Shape::Quad(_) => ShapeKind::Quad,
        }
    }

    pub fn handle_point(&self, handle: HandleType) -> Option<Point> {
        match self {
            Shape::Rect(r) => r.handle_point(handle),
            Shape::Quad(q) => q.handle_point(handle),
        }
    }

    /// The eight handle positions in hit-test order.
    pub fn handle_points(&self) -> HandlePoints {
        let at = |h: HandleType| (h, self.handle_point(h).unwrap_or_default());
        [
            at(HandleType::TopLeft),
            at(HandleType::TopRight),
            at(HandleType::BottomRight),
            at(HandleType::BottomLeft),
            at(HandleType::Left),
            at(HandleType::Right),
            at(HandleType::Top),
            at(HandleType::Bottom),
        ]
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        match self {
            Shape::Rect(r) => Shape::Rect(r.translated(delta)),
            Shape::Quad(q) => Shape::Quad(q.translated(delta)),
        }
    }

    pub fn centroid(&self) -> Point {
        match self {
            Shape::Rect(r) => r.center(),
            Shape::Quad(q) => q.centroid(),
        }
    }

    /// Corners as a quad; rects convert without rotation.
    pub fn to_quad(&self) -> Quad {
        match self {
            Shape::Rect(r) => r.to_quad(),
            Shape::Quad(q) => *q,
        }
    }

    pub fn as_rect(&self) -> Option<&ClipRect> {
        match self {
            Shape::Rect(r) => Some(r),
            Shape::Quad(_) => None,
        }
    }

    pub fn as_quad(&self) -> Option<&Quad> {
        match self {
            Shape::Quad(q) => Some(q),
            Shape::Rect(_) => None,
        }
    }
}

// ─── Raster source ───────────────────────────────────────────────────────

/// Pixel dimensions of the decoded image or rendered PDF page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RasterSize {
    pub width: f64,
    pub height: f64,
}

impl RasterSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when either side is zero, negative, or
    /// not finite (the aspect lock is skipped in that case).
    pub fn aspect_ratio(&self) -> Option<f64> {
        let ratio = self.width / self.height;
        (self.width > 0.0 && self.height > 0.0 && ratio.is_finite()).then_some(ratio)
    }

    /// World-space bounds of the raster, placed at the origin.
    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(Point::ZERO, self.width.max(0.0), self.height.max(0.0))
    }

    /// The part of `rect` that lies on the raster, snapped to whole pixels.
    ///
    /// World units are raster pixels because the raster is drawn at the
    /// origin at its natural size. Returns `None` when less than one pixel
    /// of the rect is left.
    pub fn crop_rect(&self, rect: &ClipRect) -> Option<ClipRect> {
        let bounds = self.bounds();
        let x0 = rect.min_x().clamp(0.0, bounds.width).round();
        let y0 = rect.min_y().clamp(0.0, bounds.height).round();
        let x1 = rect.max_x().clamp(0.0, bounds.width).round();
        let y1 = rect.max_y().clamp(0.0, bounds.height).round();
        if !(x1 - x0 >= 1.0 && y1 - y0 >= 1.0) {
            return None;
        }
        Some(ClipRect::new(Point::new(x0, y0), x1 - x0, y1 - y0))
    }
}
