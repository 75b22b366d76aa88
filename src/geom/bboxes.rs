use crate::geom::planar::Point2;

/// Closed axis-aligned rectangle in a slice plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2 {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox2 {
    pub fn new(xlims: (f64, f64), ylims: (f64, f64)) -> Self {
        Self {
            xmin: xlims.0,
            xmax: xlims.1,
            ymin: ylims.0,
            ymax: ylims.1,
        }
    }

    /// Smallest box holding all points. Returns `None` for an empty slice.
    pub fn from_points(pts: &[Point2]) -> Option<Self> {
        let first = pts.first()?;
        let mut bb = Self::new((first.x, first.x), (first.y, first.y));
        for p in &pts[1..] {
            bb.xmin = bb.xmin.min(p.x);
            bb.xmax = bb.xmax.max(p.x);
            bb.ymin = bb.ymin.min(p.y);
            bb.ymax = bb.ymax.max(p.y);
        }
        Some(bb)
    }

    /// Checks whether a point is inside the box (boundary included).
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Keeps the points (and their values) that lie inside `bbox`.
///
/// Returns the retained points and one filtered copy of each value column.
pub fn apply_spatial_mask(
    points: &[Point2],
    fields: &[&[f64]],
    bbox: &BoundingBox2,
) -> (Vec<Point2>, Vec<Vec<f64>>) {
    let keep: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| bbox.contains(**p))
        .map(|(i, _)| i)
        .collect();

    let pts = keep.iter().map(|&i| points[i]).collect();
    let vals = fields
        .iter()
        .map(|f| keep.iter().map(|&i| f[i]).collect())
        .collect();
    (pts, vals)
}
