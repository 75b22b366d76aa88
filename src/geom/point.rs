use crate::geom::planar::Point2;
use std::fmt;

pub mod convert;

/// A sampled surface or slice location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// In-plane (cross-sectional) coordinates, dropping the spanwise `z`.
    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(
            f,
            "Point({:.prec$}, {:.prec$}, {:.prec$})",
            self.x,
            self.y,
            self.z,
            prec = prec
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projections() {
        let p = Point::new(1., 2., 3.);
        assert_eq!(p.xy(), Point2::new(1., 2.));
    }

    #[test]
    fn test_display() {
        let p = Point::new(1., 2.5, -3.);
        assert_eq!(format!("{}", p), "Point(1.00, 2.50, -3.00)");
        assert_eq!(format!("{:.1}", p), "Point(1.0, 2.5, -3.0)");
    }
}
