use super::Point;
use crate::error::{DocumentError, DocumentResult};

/// 2D affine transformation matrix [a, b, c, d, e, f]
/// Represents: | a  c  e |
///             | b  d  f |
///             | 0  0  1 |
///
/// Operations added with the builder methods nest the way SVG `transform`
/// lists do: the most recently added operation is the first one applied to a
/// point. `Transformation` is `Copy`, so every builder call yields a fresh
/// value and a parent's transform is never modified by its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Mirror the Y axis inside a canvas of the given height (`y' = h - y`).
    pub fn vertical_flip(canvas_height: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, -1.0, 0.0, canvas_height)
    }

    /// Compose two transforms: self * other
    ///
    /// The result applies `other` first, then `self`.
    pub fn compose(&self, other: &Transformation) -> Transformation {
        Transformation {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn matrix(self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        self.compose(&Self::new(a, b, c, d, e, f))
    }

    pub fn translate(self, tx: f64, ty: f64) -> Self {
        self.compose(&Self::new(1.0, 0.0, 0.0, 1.0, tx, ty))
    }

    pub fn scale(self, factor: f64) -> Self {
        self.scale_xy(factor, factor)
    }

    pub fn scale_xy(self, sx: f64, sy: f64) -> Self {
        self.compose(&Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0))
    }

    /// Rotate by `degrees` around the origin.
    pub fn rotate(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.compose(&Self::new(cos, sin, -sin, cos, 0.0, 0.0))
    }

    /// Rotate by `degrees` around `(cx, cy)`.
    pub fn rotate_about(self, degrees: f64, cx: f64, cy: f64) -> Self {
        self.translate(cx, cy).rotate(degrees).translate(-cx, -cy)
    }

    pub fn skew_x(self, degrees: f64) -> Self {
        self.compose(&Self::new(
            1.0,
            0.0,
            degrees.to_radians().tan(),
            1.0,
            0.0,
            0.0,
        ))
    }

    pub fn skew_y(self, degrees: f64) -> Self {
        self.compose(&Self::new(
            1.0,
            degrees.to_radians().tan(),
            0.0,
            1.0,
            0.0,
            0.0,
        ))
    }

    /// Transform a point
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Append an SVG transform list (e.g. `translate(10,5) rotate(45)`).
    pub fn add_transform(self, transform: &str) -> DocumentResult<Self> {
        Ok(self.compose(&Self::parse(transform)?))
    }

    /// Parse an SVG transform list into a single matrix.
    pub fn parse(transform: &str) -> DocumentResult<Self> {
        let invalid = || DocumentError::InvalidTransform(transform.to_string());
        let mut result = Self::identity();
        let mut rest = transform.trim();

        while !rest.is_empty() {
            let open = rest.find('(').ok_or_else(invalid)?;
            let close = rest.find(')').ok_or_else(invalid)?;
            if close < open {
                return Err(invalid());
            }

            let name = rest[..open].trim();
            let args = parse_arguments(&rest[open + 1..close]).ok_or_else(invalid)?;

            result = match (name, args.as_slice()) {
                ("matrix", [a, b, c, d, e, f]) => result.matrix(*a, *b, *c, *d, *e, *f),
                ("translate", [tx]) => result.translate(*tx, 0.0),
                ("translate", [tx, ty]) => result.translate(*tx, *ty),
                ("scale", [s]) => result.scale(*s),
                ("scale", [sx, sy]) => result.scale_xy(*sx, *sy),
                ("rotate", [angle]) => result.rotate(*angle),
                ("rotate", [angle, cx, cy]) => result.rotate_about(*angle, *cx, *cy),
                ("skewX", [angle]) => result.skew_x(*angle),
                ("skewY", [angle]) => result.skew_y(*angle),
                _ => return Err(invalid()),
            };

            rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        }

        Ok(result)
    }
}

fn parse_arguments(args: &str) -> Option<Vec<f64>> {
    args.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}
