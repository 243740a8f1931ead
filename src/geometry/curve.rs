use super::{Point, Transformation};
use std::f64::consts::PI;

/// Spans are always split at least this many times before the flatness test
/// is trusted, otherwise an S-shaped cubic whose midpoint happens to sit on
/// its chord would collapse into a single line.
const MIN_SUBDIVISION_DEPTH: u32 = 2;
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// A drawable planar primitive.
///
/// Curves are immutable; transforming one produces a new curve.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Line {
        start: Point,
        end: Point,
    },
    QuadraticBezier {
        start: Point,
        control: Point,
        end: Point,
    },
    CubicBezier {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
    EllipticalArc(EllipticalArc),
}

impl Curve {
    pub fn line(start: Point, end: Point) -> Self {
        Curve::Line { start, end }
    }

    pub fn start(&self) -> Point {
        match self {
            Curve::Line { start, .. }
            | Curve::QuadraticBezier { start, .. }
            | Curve::CubicBezier { start, .. } => *start,
            Curve::EllipticalArc(arc) => arc.start(),
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Curve::Line { end, .. }
            | Curve::QuadraticBezier { end, .. }
            | Curve::CubicBezier { end, .. } => *end,
            Curve::EllipticalArc(arc) => arc.end(),
        }
    }

    /// Sample the curve at `t` in [0, 1]. Values outside are clamped.
    pub fn point(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Line { start, end } => start.lerp(end, t),
            Curve::QuadraticBezier {
                start,
                control,
                end,
            } => {
                let mt = 1.0 - t;
                *start * (mt * mt) + *control * (2.0 * mt * t) + *end * (t * t)
            }
            Curve::CubicBezier {
                start,
                control1,
                control2,
                end,
            } => cubic_point(t, *start, *control1, *control2, *end),
            Curve::EllipticalArc(arc) => arc.point(t),
        }
    }

    /// Map every point of the curve through `transformation`.
    ///
    /// Bezier curves are affine invariant, so only their control points move.
    /// Arcs keep their own parametrisation and carry the matrix along.
    pub fn transformed(&self, transformation: &Transformation) -> Curve {
        let tx = |p: &Point| transformation.apply(*p);
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: tx(start),
                end: tx(end),
            },
            Curve::QuadraticBezier {
                start,
                control,
                end,
            } => Curve::QuadraticBezier {
                start: tx(start),
                control: tx(control),
                end: tx(end),
            },
            Curve::CubicBezier {
                start,
                control1,
                control2,
                end,
            } => Curve::CubicBezier {
                start: tx(start),
                control1: tx(control1),
                control2: tx(control2),
                end: tx(end),
            },
            Curve::EllipticalArc(arc) => Curve::EllipticalArc(EllipticalArc {
                transform: transformation.compose(&arc.transform),
                ..arc.clone()
            }),
        }
    }

    /// Approximate the curve with straight segments.
    ///
    /// Returns the points to visit after `start()`; the last one is exactly
    /// `end()`. No sampled point strays from the true curve by more than
    /// `tolerance` at the middle of its span.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point> {
        if let Curve::Line { end, .. } = self {
            return vec![*end];
        }

        let mut points = Vec::new();
        self.subdivide(0.0, 1.0, self.start(), self.end(), tolerance, 0, &mut points);
        points
    }

    #[allow(clippy::too_many_arguments)]
    fn subdivide(
        &self,
        t0: f64,
        t1: f64,
        p0: Point,
        p1: Point,
        tolerance: f64,
        depth: u32,
        out: &mut Vec<Point>,
    ) {
        let tm = (t0 + t1) / 2.0;
        let pm = self.point(tm);
        let flat = pm.distance(&p0.midpoint(&p1)) <= tolerance;

        if depth >= MAX_SUBDIVISION_DEPTH || (depth >= MIN_SUBDIVISION_DEPTH && flat) {
            out.push(p1);
            return;
        }

        self.subdivide(t0, tm, p0, pm, tolerance, depth + 1, out);
        self.subdivide(tm, t1, pm, p1, tolerance, depth + 1, out);
    }
}

/// Evaluate a cubic Bezier curve at parameter t
fn cubic_point(t: f64, p0: Point, c0: Point, c1: Point, p1: Point) -> Point {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;
    let t2 = t * t;
    let t3 = t2 * t;

    p0 * mt3 + c0 * (3.0 * mt2 * t) + c1 * (3.0 * mt * t2) + p1 * t3
}

/// An elliptical arc in centre parametrisation, followed by an affine map.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalArc {
    /// Endpoints before `transform`, kept so sampling hits them exactly.
    pub raw_start: Point,
    pub raw_end: Point,
    pub center: Point,
    pub radii: Point,
    /// Rotation of the ellipse's x-axis, in radians.
    pub rotation: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
    pub transform: Transformation,
}

impl EllipticalArc {
    /// Build an arc from SVG endpoint parameters (the `A` path command).
    ///
    /// Returns `None` when the endpoints coincide, since such an arc draws
    /// nothing. Zero radii degrade to a straight line.
    pub fn from_endpoints(
        start: Point,
        end: Point,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
    ) -> Option<Curve> {
        if start == end {
            return None;
        }

        let (mut rx, mut ry) = (rx.abs(), ry.abs());
        if rx == 0.0 || ry == 0.0 {
            return Some(Curve::line(start, end));
        }

        let phi = x_axis_rotation.to_radians();
        let (sin, cos) = phi.sin_cos();

        let dx2 = (start.x - end.x) / 2.0;
        let dy2 = (start.y - end.y) / 2.0;
        let x1p = cos * dx2 + sin * dy2;
        let y1p = -sin * dx2 + cos * dy2;

        // Radii too small to reach the end point are scaled up uniformly.
        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        let mut coef = (num / den).max(0.0).sqrt();
        if large_arc == sweep {
            coef = -coef;
        }

        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;
        let center = Point::new(
            cos * cxp - sin * cyp + (start.x + end.x) / 2.0,
            sin * cxp + cos * cyp + (start.y + end.y) / 2.0,
        );

        let start_angle = vector_angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
        let mut sweep_angle = vector_angle(
            (x1p - cxp) / rx,
            (y1p - cyp) / ry,
            (-x1p - cxp) / rx,
            (-y1p - cyp) / ry,
        );

        if !sweep && sweep_angle > 0.0 {
            sweep_angle -= 2.0 * PI;
        } else if sweep && sweep_angle < 0.0 {
            sweep_angle += 2.0 * PI;
        }

        Some(Curve::EllipticalArc(EllipticalArc {
            raw_start: start,
            raw_end: end,
            center,
            radii: Point::new(rx, ry),
            rotation: phi,
            start_angle,
            sweep_angle,
            transform: Transformation::identity(),
        }))
    }

    pub fn start(&self) -> Point {
        self.transform.apply(self.raw_start)
    }

    pub fn end(&self) -> Point {
        self.transform.apply(self.raw_end)
    }

    pub fn point(&self, t: f64) -> Point {
        if t <= 0.0 {
            return self.start();
        }
        if t >= 1.0 {
            return self.end();
        }

        let angle = self.start_angle + self.sweep_angle * t;
        let (sin_r, cos_r) = self.rotation.sin_cos();
        let ex = self.radii.x * angle.cos();
        let ey = self.radii.y * angle.sin();
        let local = Point::new(
            cos_r * ex - sin_r * ey + self.center.x,
            sin_r * ex + cos_r * ey + self.center.y,
        );
        self.transform.apply(local)
    }
}

/// Signed angle from vector u to vector v.
fn vector_angle(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    (ux * vy - uy * vx).atan2(ux * vx + uy * vy)
}
