//! Delaunay triangulation of scattered slice points via Bowyer-Watson insertion.
//!
//! Points are inserted in order of increasing `x`. A triangle whose circumcircle
//! lies entirely to the left of the point being inserted can never be broken by a
//! later point, so it leaves the working set. This keeps the cavity search short
//! for the dense slices exported by the solver.
//!
//! Coincident points are inserted once (the first occurrence wins).
//!
//! The super-triangle is finite, so a super-vertex can fall inside the
//! circumcircle of nearly collinear hull points and take the thin triangles
//! along the hull with it. These pockets are filled afterwards, so the result
//! always covers the convex hull of the input.

use std::collections::{HashMap, HashSet};

use crate::geom::bboxes::BoundingBox2;
use crate::geom::planar::{Point2, circumcircle, orient};

/// Relative slack of the in-circle test, so cocircular grid points break ties consistently.
const IN_CIRCLE_TOL: f64 = 1e-12;

/// Internal triangle representation with cached circumcircle data.
struct BwTri {
    v: [usize; 3],
    center: Point2,
    radius_sq: f64,
}

impl BwTri {
    fn new(v: [usize; 3], pts: &[Point2]) -> Option<Self> {
        let (center, radius_sq) = circumcircle(pts[v[0]], pts[v[1]], pts[v[2]])?;
        Some(Self {
            v,
            center,
            radius_sq,
        })
    }

    fn edges(&self) -> [[usize; 2]; 3] {
        [
            [self.v[0], self.v[1]],
            [self.v[1], self.v[2]],
            [self.v[2], self.v[0]],
        ]
    }
}

/// An edge key with sorted vertex indices for hashing.
#[derive(Hash, Eq, PartialEq)]
struct EdgeKey([usize; 2]);

impl EdgeKey {
    fn new(a: usize, b: usize) -> Self {
        if a < b { EdgeKey([a, b]) } else { EdgeKey([b, a]) }
    }
}

/// Creates a super-triangle enclosing all given points with a wide margin.
fn super_triangle(points: &[Point2]) -> Option<[Point2; 3]> {
    let bb = BoundingBox2::from_points(points)?;
    let cx = (bb.xmin + bb.xmax) * 0.5;
    let cy = (bb.ymin + bb.ymax) * 0.5;
    let scale = 100.0 * bb.width().max(bb.height()).max(1e-6);

    Some([
        Point2::new(cx - 2.0 * scale, cy - scale),
        Point2::new(cx + 2.0 * scale, cy - scale),
        Point2::new(cx, cy + 2.0 * scale),
    ])
}

/// Adds the triangles missing between the triangulated region and the convex hull.
///
/// Walks the outer boundary counter-clockwise from the leftmost vertex and
/// closes every reflex turn with a triangle, as in a Graham scan.
fn fill_hull_pockets(points: &[Point2], tris: &mut Vec<[usize; 3]>) {
    let mut directed: HashSet<(usize, usize)> = HashSet::new();
    for t in tris.iter() {
        let [a, b, c] = if orient(points[t[0]], points[t[1]], points[t[2]]) < 0.0 {
            [t[0], t[2], t[1]]
        } else {
            *t
        };
        directed.extend([(a, b), (b, c), (c, a)]);
    }

    // Boundary edges have the interior on their left
    let mut next: HashMap<usize, usize> = HashMap::new();
    for &(a, b) in &directed {
        if !directed.contains(&(b, a)) && next.insert(a, b).is_some() {
            log::debug!("triangulation boundary touches itself at vertex {a}; hull not filled");
            return;
        }
    }
    let Some(start) = next.keys().copied().min_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
    }) else {
        return;
    };

    let mut cycle = vec![start];
    let mut v = start;
    while let Some(&w) = next.get(&v) {
        if w == start || cycle.len() > next.len() {
            break;
        }
        cycle.push(w);
        v = w;
    }
    if cycle.len() != next.len() {
        log::debug!("triangulation boundary is not a single loop; hull not filled");
        return;
    }

    let before = tris.len();
    let mut stack: Vec<usize> = Vec::with_capacity(cycle.len() + 1);
    for &v in cycle.iter().chain(std::iter::once(&start)) {
        while stack.len() >= 2 {
            let (a, b) = (stack[stack.len() - 2], stack[stack.len() - 1]);
            if orient(points[a], points[b], points[v]) >= 0.0 {
                break;
            }
            tris.push([a, b, v]);
            stack.pop();
        }
        stack.push(v);
    }
    if tris.len() > before {
        log::debug!("filled {} triangle(s) along the hull", tris.len() - before);
    }
}

/// Bowyer-Watson incremental Delaunay triangulation.
///
/// Returns `None` if fewer than 3 distinct points are given or all points are collinear.
/// The returned triangles reference indices into the original `points` slice.
pub fn bowyer_watson(points: &[Point2]) -> Option<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);

    // Build combined vertex array: original points + super-triangle vertices
    let super_pts = super_triangle(points)?;
    let mut all_points: Vec<Point2> = points.to_vec();
    all_points.extend_from_slice(&super_pts);

    let mut active: Vec<BwTri> = vec![BwTri::new([n, n + 1, n + 2], &all_points)?];
    let mut finished: Vec<BwTri> = Vec::new();

    for &i in &order {
        let pt = all_points[i];

        // Retire triangles left behind by the sweep, collect the cavity of bad ones
        let mut edge_count: HashMap<EdgeKey, (usize, [usize; 2])> = HashMap::new();
        let mut k = 0;
        while k < active.len() {
            let tri = &active[k];
            let dx = pt.x - tri.center.x;
            let limit = tri.radius_sq * (1.0 + IN_CIRCLE_TOL);
            if dx > 0.0 && dx * dx > limit {
                finished.push(active.swap_remove(k));
                continue;
            }
            let dy = pt.y - tri.center.y;
            if dx * dx + dy * dy <= limit {
                let bad = active.swap_remove(k);
                for [a, b] in bad.edges() {
                    edge_count
                        .entry(EdgeKey::new(a, b))
                        .and_modify(|(count, _)| *count += 1)
                        .or_insert((1, [a, b]));
                }
                continue;
            }
            k += 1;
        }

        // Cavity boundary: edges shared by exactly one bad triangle
        let mut boundary: Vec<[usize; 2]> = edge_count
            .into_values()
            .filter(|(count, _)| *count == 1)
            .map(|(_, edge)| edge)
            .collect();
        boundary.sort_unstable();

        for [a, b] in boundary {
            if let Some(tri) = BwTri::new([a, b, i], &all_points) {
                active.push(tri);
            }
        }
    }

    finished.extend(active);

    // Remove triangles referencing super-triangle vertices
    let mut result: Vec<[usize; 3]> = finished
        .into_iter()
        .filter(|t| t.v.iter().all(|&vi| vi < n))
        .map(|t| t.v)
        .collect();
    fill_hull_pockets(points, &mut result);
    result.sort_unstable();

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}
