//! Linear interpolation of scattered plane samples onto a regular grid.
//!
//! The scatter is triangulated (Delaunay) and values are blended with the
//! barycentric weights of the enclosing triangle. Grid nodes outside the convex
//! hull of the scatter get NaN, which the spanwise reduction then ignores.

use crate::error::PostError;
use crate::geom::bboxes::{BoundingBox2, apply_spatial_mask};
use crate::geom::bins::TriangleBins;
use crate::geom::delaunay::bowyer_watson;
use crate::geom::planar::{Point2, barycentric};
use crate::vecutils::{linspace, nanmean};
use anyhow::{Result, anyhow};
use ndarray::Array2;

/// Barycentric weights above this are treated as inside the triangle.
const INSIDE_TOL: f64 = -1e-12;

/// Rectilinear grid: `x` along columns (in-plane axis), `y` along rows (spanwise axis).
#[derive(Debug, Clone, PartialEq)]
pub struct RegularGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl RegularGrid {
    pub fn new(xlims: (f64, f64), ylims: (f64, f64), nx: usize, ny: usize) -> Self {
        Self {
            x: linspace(xlims.0, xlims.1, nx),
            y: linspace(ylims.0, ylims.1, ny),
        }
    }

    /// `(rows, columns)` = `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        let (x0, x1) = (*self.x.first()?, *self.x.last()?);
        let (y0, y1) = (*self.y.first()?, *self.y.last()?);
        Some(BoundingBox2::new((x0, x1), (y0, y1)))
    }
}

/// Piecewise-linear interpolant over a Delaunay triangulation.
pub struct LinearInterpolator {
    points: Vec<Point2>,
    triangles: Vec<[usize; 3]>,
    bins: TriangleBins,
}

impl LinearInterpolator {
    pub fn new(points: Vec<Point2>) -> Result<Self> {
        let triangles = bowyer_watson(&points).ok_or_else(|| {
            anyhow!(
                "cannot triangulate {} point(s): need at least 3 non-collinear points",
                points.len()
            )
        })?;
        let step = TriangleBins::suggested_step(&points, triangles.len());
        let bins = TriangleBins::new(&points, &triangles, step);
        log::debug!(
            "triangulated {} point(s) into {} triangle(s)",
            points.len(),
            triangles.len()
        );
        Ok(Self {
            points,
            triangles,
            bins,
        })
    }

    /// Triangle containing `pos` and the barycentric weights of `pos` in it.
    fn locate(&self, pos: Point2) -> Option<(usize, [f64; 3])> {
        self.bins.find_nearby(pos).iter().find_map(|&t| {
            let [a, b, c] = self.triangles[t];
            let w = barycentric(pos, self.points[a], self.points[b], self.points[c])?;
            w.iter().all(|&wi| wi >= INSIDE_TOL).then_some((t, w))
        })
    }

    /// Interpolated value at `pos`; NaN outside the triangulation.
    pub fn interpolate_at(&self, values: &[f64], pos: Point2) -> f64 {
        match self.locate(pos) {
            Some((t, w)) => {
                let [a, b, c] = self.triangles[t];
                w[0] * values[a] + w[1] * values[b] + w[2] * values[c]
            }
            None => f64::NAN,
        }
    }

    /// Interpolates one field onto every node of `grid`, shape `(ny, nx)`.
    pub fn interpolate_grid(&self, values: &[f64], grid: &RegularGrid) -> Result<Array2<f64>> {
        if values.len() != self.points.len() {
            return Err(PostError::LengthMismatch {
                what: "interpolated field".to_string(),
                expected: self.points.len(),
                actual: values.len(),
            }
            .into());
        }
        Ok(Array2::from_shape_fn(grid.shape(), |(j, i)| {
            self.interpolate_at(values, Point2::new(grid.x[i], grid.y[j]))
        }))
    }
}

/// Mean of every column over the rows, ignoring NaN.
pub fn nanmean_axis0(a: &Array2<f64>) -> Vec<f64> {
    a.columns().into_iter().map(|c| nanmean(&c.to_vec())).collect()
}

/// Interpolates scattered fields onto `grid` and averages them along its rows.
///
/// `points` are in-plane coordinates `(a, z)` with `z` the spanwise direction.
/// When `mask` is given, samples outside it are dropped first. Returns one
/// profile of length `nx` per field.
pub fn spanwise_profile(
    points: &[Point2],
    fields: &[&[f64]],
    grid: &RegularGrid,
    mask: Option<&BoundingBox2>,
) -> Result<Vec<Vec<f64>>> {
    for field in fields {
        if field.len() != points.len() {
            return Err(PostError::LengthMismatch {
                what: "profile field".to_string(),
                expected: points.len(),
                actual: field.len(),
            }
            .into());
        }
    }

    let (points, fields) = match mask {
        Some(bbox) => {
            let (pts, vals) = apply_spatial_mask(points, fields, bbox);
            log::debug!("spatial mask kept {} of {} point(s)", pts.len(), points.len());
            (pts, vals)
        }
        None => (points.to_vec(), fields.iter().map(|f| f.to_vec()).collect()),
    };

    let interpolator = LinearInterpolator::new(points)?;
    fields
        .iter()
        .map(|f| -> Result<Vec<f64>> {
            Ok(nanmean_axis0(&interpolator.interpolate_grid(f, grid)?))
        })
        .collect()
}
