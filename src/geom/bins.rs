use std::collections::HashMap;

use crate::geom::bboxes::BoundingBox2;
use crate::geom::planar::Point2;

/// Uniform bucket grid mapping plane cells to the triangles overlapping them.
///
/// Every triangle is registered in each cell touched by its bounding box, so the
/// cell containing a query point lists every triangle that can contain it.
pub struct TriangleBins {
    grid: HashMap<(i64, i64), Vec<usize>>,
    step: f64,
}

impl TriangleBins {
    pub fn new(points: &[Point2], triangles: &[[usize; 3]], step: f64) -> Self {
        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

        for (idx, tri) in triangles.iter().enumerate() {
            let corners = [points[tri[0]], points[tri[1]], points[tri[2]]];
            let Some(bb) = BoundingBox2::from_points(&corners) else {
                continue;
            };
            let (imin, jmin) = cell_of(Point2::new(bb.xmin, bb.ymin), step);
            let (imax, jmax) = cell_of(Point2::new(bb.xmax, bb.ymax), step);
            for i in imin..=imax {
                for j in jmin..=jmax {
                    grid.entry((i, j)).or_default().push(idx);
                }
            }
        }

        Self { grid, step }
    }

    /// Cell size giving roughly a couple of triangles per cell.
    pub fn suggested_step(points: &[Point2], num_triangles: usize) -> f64 {
        let Some(bb) = BoundingBox2::from_points(points) else {
            return 1.0;
        };
        let area = (bb.width() * bb.height()).max(1e-24);
        (2.0 * area / num_triangles.max(1) as f64).sqrt().max(1e-12)
    }

    /// Triangle indices registered in the cell containing `pos`.
    pub fn find_nearby(&self, pos: Point2) -> &[usize] {
        self.grid
            .get(&cell_of(pos, self.step))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

fn cell_of(pos: Point2, step: f64) -> (i64, i64) {
    (
        (pos.x / step).floor() as i64,
        (pos.y / step).floor() as i64,
    )
}
