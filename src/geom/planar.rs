//! Points and triangle helpers in a 2D slice plane.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        write!(f, "Point2({:.prec$}, {:.prec$})", self.x, self.y, prec = prec)
    }
}

/// Twice the signed area of triangle `abc` (positive when counter-clockwise).
pub fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Circumcircle center and squared radius. Returns `None` for collinear points.
pub fn circumcircle(a: Point2, b: Point2, c: Point2) -> Option<(Point2, f64)> {
    let d = 2.0 * orient(a, b, c);
    if d.abs() < 1e-300 {
        return None;
    }
    // Relative to `a` to limit cancellation
    let (bx, by) = (b.x - a.x, b.y - a.y);
    let (cx, cy) = (c.x - a.x, c.y - a.y);
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    Some((Point2::new(a.x + ux, a.y + uy), ux * ux + uy * uy))
}

/// Barycentric weights of `p` with respect to triangle `abc`.
pub fn barycentric(p: Point2, a: Point2, b: Point2, c: Point2) -> Option<[f64; 3]> {
    let area = orient(a, b, c);
    if area == 0.0 {
        return None;
    }
    let wa = orient(p, b, c) / area;
    let wb = orient(a, p, c) / area;
    Some([wa, wb, 1.0 - wa - wb])
}
