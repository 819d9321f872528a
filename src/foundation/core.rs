pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Blue channel byte offset inside one BGRA8 pixel.
pub const B: usize = 0;
/// Green channel byte offset.
pub const G: usize = 1;
/// Red channel byte offset.
pub const R: usize = 2;
/// Alpha channel byte offset.
pub const A: usize = 3;

/// Integer pixel position.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntPoint {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl IntPoint {
    /// The origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for IntPoint {
    type Output = IntPoint;

    fn add(self, rhs: IntPoint) -> IntPoint {
        IntPoint::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl std::ops::Sub for IntPoint {
    type Output = IntPoint;

    fn sub(self, rhs: IntPoint) -> IntPoint {
        IntPoint::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl std::ops::Neg for IntPoint {
    type Output = IntPoint;

    fn neg(self) -> IntPoint {
        IntPoint::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

/// Integer pixel extent. Negative components are treated as empty.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntSize {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl IntSize {
    /// Construct a size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is non-positive.
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Integer rectangle in filter space: origin plus size, half-open on the far edges.
///
/// All empty rectangles compare equal to [`IntRect::ZERO`] after any set operation, so
/// geometry code can use `==` without normalizing first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl IntRect {
    /// Canonical empty rectangle.
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Construct from origin and size components.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Construct from an origin point and a size.
    pub fn from_origin_size(origin: IntPoint, size: IntSize) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Build from edges; returns [`IntRect::ZERO`] when the edges do not enclose any pixel.
    pub fn from_edges(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        if x1 <= x0 || y1 <= y0 {
            return Self::ZERO;
        }
        let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let (x0, y0, x1, y1) = (clamp(x0), clamp(y0), clamp(x1), clamp(y1));
        if x1 <= x0 || y1 <= y0 {
            return Self::ZERO;
        }
        Self::new(
            x0,
            y0,
            (i64::from(x1) - i64::from(x0)).min(i64::from(i32::MAX)) as i32,
            (i64::from(y1) - i64::from(y0)).min(i64::from(i32::MAX)) as i32,
        )
    }

    /// True when the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge.
    pub fn x_most(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn y_most(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Origin of the rectangle.
    pub fn top_left(&self) -> IntPoint {
        IntPoint::new(self.x, self.y)
    }

    /// Size of the rectangle.
    pub fn size(&self) -> IntSize {
        IntSize::new(self.width, self.height)
    }

    /// Pixel count, zero for empty rectangles.
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (self.width as u64) * (self.height as u64)
    }

    /// Overlap of two rectangles.
    pub fn intersect(&self, other: &IntRect) -> IntRect {
        if self.is_empty() || other.is_empty() {
            return Self::ZERO;
        }
        Self::from_edges(
            i64::from(self.x.max(other.x)),
            i64::from(self.y.max(other.y)),
            self.x_most().min(other.x_most()),
            self.y_most().min(other.y_most()),
        )
    }

    /// Smallest rectangle containing both; an empty operand contributes nothing.
    pub fn union(&self, other: &IntRect) -> IntRect {
        if self.is_empty() {
            return other.normalized();
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_edges(
            i64::from(self.x.min(other.x)),
            i64::from(self.y.min(other.y)),
            self.x_most().max(other.x_most()),
            self.y_most().max(other.y_most()),
        )
    }

    /// True when every pixel of `other` lies inside `self`. Empty rects are contained everywhere.
    pub fn contains_rect(&self, other: &IntRect) -> bool {
        if other.is_empty() {
            return true;
        }
        !self.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.x_most() <= self.x_most()
            && other.y_most() <= self.y_most()
    }

    /// True when the pixel at `p` lies inside.
    pub fn contains_point(&self, p: IntPoint) -> bool {
        !self.is_empty()
            && p.x >= self.x
            && p.y >= self.y
            && i64::from(p.x) < self.x_most()
            && i64::from(p.y) < self.y_most()
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom. Negative values shrink.
    pub fn inflate(&self, dx: i32, dy: i32) -> IntRect {
        if self.is_empty() {
            return Self::ZERO;
        }
        Self::from_edges(
            i64::from(self.x) - i64::from(dx),
            i64::from(self.y) - i64::from(dy),
            self.x_most() + i64::from(dx),
            self.y_most() + i64::from(dy),
        )
    }

    /// Grow by independent margins on each side.
    pub fn inflate_margin(&self, left: i32, top: i32, right: i32, bottom: i32) -> IntRect {
        if self.is_empty() {
            return Self::ZERO;
        }
        Self::from_edges(
            i64::from(self.x) - i64::from(left),
            i64::from(self.y) - i64::from(top),
            self.x_most() + i64::from(right),
            self.y_most() + i64::from(bottom),
        )
    }

    /// Inverse of [`IntRect::inflate`].
    pub fn deflate(&self, dx: i32, dy: i32) -> IntRect {
        self.inflate(-dx, -dy)
    }

    /// Shift by a vector.
    pub fn translate(&self, by: IntPoint) -> IntRect {
        if self.is_empty() {
            return Self::ZERO;
        }
        Self::from_edges(
            i64::from(self.x) + i64::from(by.x),
            i64::from(self.y) + i64::from(by.y),
            self.x_most() + i64::from(by.x),
            self.y_most() + i64::from(by.y),
        )
    }

    fn normalized(&self) -> IntRect {
        if self.is_empty() { Self::ZERO } else { *self }
    }

    /// Smallest integer rectangle covering `r` (edges rounded outward).
    pub fn round_out(r: Rect) -> IntRect {
        let r = r.abs().expand();
        if !r.is_finite() {
            return Self::ZERO;
        }
        Self::from_edges(r.x0 as i64, r.y0 as i64, r.x1 as i64, r.y1 as i64)
    }

    /// Integer rectangle with every edge rounded to the nearest integer.
    pub fn round(r: Rect) -> IntRect {
        let r = r.abs().round();
        if !r.is_finite() {
            return Self::ZERO;
        }
        Self::from_edges(r.x0 as i64, r.y0 as i64, r.x1 as i64, r.y1 as i64)
    }

    /// Float rectangle with the same edges.
    pub fn to_rect(&self) -> Rect {
        if self.is_empty() {
            return Rect::ZERO;
        }
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            self.x_most() as f64,
            self.y_most() as f64,
        )
    }
}

/// Straight-alpha color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Construct from straight components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Opaque white.
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Premultiplied BGRA8 bytes, each channel rounded to nearest.
    pub fn to_premul_bgra(self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        let q = |c: f32| (c.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        let mut px = [0u8; 4];
        px[B] = q(self.b);
        px[G] = q(self.g);
        px[R] = q(self.r);
        px[A] = (a * 255.0).round() as u8;
        px
    }

    /// Straight BGRA8 bytes (color channels not scaled by alpha).
    pub fn to_straight_bgra(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut px = [0u8; 4];
        px[B] = q(self.b);
        px[G] = q(self.g);
        px[R] = q(self.r);
        px[A] = q(self.a);
        px
    }
}

/// 5x4 color matrix: rows are the R, G, B, A input channels plus a constant bias row;
/// columns are the R, G, B, A output channels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Matrix5x4 {
    /// `rows[input][output]`, with `rows[4]` holding the bias.
    pub rows: [[f32; 4]; 5],
}

impl Default for Matrix5x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix5x4 {
    /// Identity matrix with zero bias.
    pub const fn identity() -> Self {
        Self {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
                [0.0, 0.0, 0.0, 0.0],
            ],
        }
    }

    /// Build from 20 row-major floats.
    pub fn from_row_major(v: &[f32; 20]) -> Self {
        let mut rows = [[0.0f32; 4]; 5];
        for (i, row) in rows.iter_mut().enumerate() {
            row.copy_from_slice(&v[i * 4..i * 4 + 4]);
        }
        Self { rows }
    }

    /// Flatten to 20 row-major floats.
    pub fn to_row_major(&self) -> [f32; 20] {
        let mut out = [0.0f32; 20];
        for (i, row) in self.rows.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(row);
        }
        out
    }

    /// Constant added to the alpha output, in unit range.
    pub fn alpha_bias(&self) -> f32 {
        self.rows[4][3]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
