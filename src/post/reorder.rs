//! Recovers a consistent point ordering for surface samples of extruded bodies.
//!
//! The exporter writes surface points in mesh order. For a body made of `S`
//! identical cross-sections stacked along `z`, this module finds the permutation
//! that:
//!
//! 1. groups points by non-decreasing `z` (stable sort), giving `S` contiguous
//!    sections of `M = N / S` points each;
//! 2. orders each section along its contour: start at the highest point
//!    (maximum `y`) and repeatedly step to the nearest point not yet visited.
//!
//! The walk is a greedy nearest-neighbour chain; it follows the contour as long as
//! the spacing between neighbouring surface points is smaller than the thickness
//! of the body. Ties are broken geometrically (larger `y`, then larger `x`), so the
//! result does not depend on the storage order of distinct points. Coincident
//! points are not detected; they are visited consecutively, lowest index first.
//!
//! The permutation must be derived once, from a reference instant, and reused
//! for every other instant of the same run so that slot `i` always refers to the
//! same physical location.

use crate::Point;
use crate::error::PostError;
use crate::geom::planar::Point2;
use crate::post::sample::SurfaceSample;
use crate::vecutils::take;
use anyhow::Result;
use ndarray::Array2;

/// Result of the spanwise grouping step.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroups {
    /// Point indices sorted by `z`; section `s` is `order[s * per_section..(s + 1) * per_section]`.
    pub order: Vec<usize>,
    /// Spanwise position of each section, increasing.
    pub z: Vec<f64>,
    pub per_section: usize,
}

impl SectionGroups {
    pub fn num_sections(&self) -> usize {
        self.z.len()
    }

    /// Indices (into the original points) of section `s`.
    pub fn section(&self, s: usize) -> &[usize] {
        &self.order[s * self.per_section..(s + 1) * self.per_section]
    }
}

/// Groups points into spanwise sections of identical size.
///
/// Points belong to the same section when their `z` values are exactly equal.
pub fn group_sections(points: &[Point]) -> Result<SectionGroups> {
    if points.is_empty() {
        return Err(PostError::EmptyInput {
            what: "surface sample".to_string(),
        }
        .into());
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[a].z.total_cmp(&points[b].z));

    // Runs of equal z along the sorted order
    let (z, sizes): (Vec<f64>, Vec<usize>) = order
        .chunk_by(|&a, &b| points[a].z == points[b].z)
        .map(|run| (points[run[0]].z, run.len()))
        .unzip();

    let num_sections = z.len();
    if points.len() % num_sections != 0 {
        return Err(PostError::UnevenSections {
            points: points.len(),
            sections: num_sections,
        }
        .into());
    }
    let per_section = points.len() / num_sections;
    if let Some((section, &actual)) = sizes.iter().enumerate().find(|(_, n)| **n != per_section) {
        return Err(PostError::SectionSize {
            section,
            z: z[section],
            expected: per_section,
            actual,
        }
        .into());
    }

    Ok(SectionGroups {
        order,
        z,
        per_section,
    })
}

/// Full pairwise distance matrix of a section.
fn distance_matrix(pts: &[Point2]) -> Array2<f64> {
    let m = pts.len();
    let mut dist = Array2::<f64>::zeros((m, m));
    for i in 0..m {
        for j in (i + 1)..m {
            let d = pts[i].distance(&pts[j]);
            dist[[i, j]] = d;
            dist[[j, i]] = d;
        }
    }
    dist
}

/// True if point `a` wins a tie against point `b`: higher, then further right.
fn ranks_before(pts: &[Point2], a: usize, b: usize) -> bool {
    pts[a].y > pts[b].y || (pts[a].y == pts[b].y && pts[a].x > pts[b].x)
}

/// Orders the points of one cross-section along its contour.
///
/// Returns a permutation of `0..pts.len()` starting at the highest point.
pub fn trace_section(pts: &[Point2]) -> Vec<usize> {
    let m = pts.len();
    if m == 0 {
        return Vec::new();
    }

    let mut start = 0;
    for i in 1..m {
        if ranks_before(pts, i, start) {
            start = i;
        }
    }

    let dist = distance_matrix(pts);
    let mut visited = vec![false; m];
    let mut path = Vec::with_capacity(m);
    visited[start] = true;
    path.push(start);

    let mut current = start;
    for _ in 1..m {
        let row = dist.row(current);
        let mut next: Option<usize> = None;
        for j in 0..m {
            if visited[j] {
                continue;
            }
            next = match next {
                Some(b) if row[j] > row[b] => Some(b),
                Some(b) if row[j] == row[b] && !ranks_before(pts, j, b) => Some(b),
                _ => Some(j),
            };
        }
        // Unvisited points remain while the loop runs
        let Some(next) = next else { break };
        visited[next] = true;
        path.push(next);
        current = next;
    }

    path
}

/// Global index permutation bringing a surface sample into canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOrdering {
    indices: Vec<usize>,
    num_sections: usize,
    per_section: usize,
}

impl SectionOrdering {
    /// Derives the ordering from the point coordinates of a reference sample.
    pub fn derive(points: &[Point]) -> Result<Self> {
        let groups = group_sections(points)?;
        let mut indices = Vec::with_capacity(points.len());

        for s in 0..groups.num_sections() {
            let members = groups.section(s);
            let xy: Vec<Point2> = members.iter().map(|&i| points[i].xy()).collect();
            indices.extend(trace_section(&xy).into_iter().map(|local| members[local]));
        }
        log::debug!(
            "derived ordering of {} points in {} section(s)",
            points.len(),
            groups.num_sections()
        );

        Ok(Self {
            indices,
            num_sections: groups.num_sections(),
            per_section: groups.per_section,
        })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn num_sections(&self) -> usize {
        self.num_sections
    }

    pub fn per_section(&self) -> usize {
        self.per_section
    }

    pub fn is_identity(&self) -> bool {
        self.indices.iter().enumerate().all(|(i, &j)| i == j)
    }

    /// Reorders any per-point array: `out[i] = v[indices[i]]`.
    pub fn apply<T: Clone>(&self, v: &[T]) -> Result<Vec<T>> {
        if v.len() != self.indices.len() {
            return Err(PostError::LengthMismatch {
                what: "array to reorder".to_string(),
                expected: self.indices.len(),
                actual: v.len(),
            }
            .into());
        }
        Ok(take(v, &self.indices))
    }

    /// Reorders the points and every field of a sample.
    pub fn apply_to_sample(&self, sample: &SurfaceSample) -> Result<SurfaceSample> {
        let points = self.apply(&sample.points)?;
        let values = sample
            .values
            .iter()
            .map(|f| self.apply(f))
            .collect::<Result<Vec<_>>>()?;
        SurfaceSample::new(points, values)
    }
}

/// Sorts a sample by section and along each section's contour.
pub fn sort_sections(sample: &SurfaceSample) -> Result<(SurfaceSample, SectionOrdering)> {
    let ordering = SectionOrdering::derive(&sample.points)?;
    let sorted = ordering.apply_to_sample(sample)?;
    Ok((sorted, ordering))
}
