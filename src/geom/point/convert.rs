use crate::Point;
use crate::error::PostError;
use anyhow::Result;

/// Zips three coordinate columns into points.
pub fn points_from_columns(x: &[f64], y: &[f64], z: &[f64]) -> Result<Vec<Point>> {
    for (what, col) in [("y coordinates", y), ("z coordinates", z)] {
        if col.len() != x.len() {
            return Err(PostError::LengthMismatch {
                what: what.to_string(),
                expected: x.len(),
                actual: col.len(),
            }
            .into());
        }
    }

    Ok(x.iter()
        .zip(y)
        .zip(z)
        .map(|((&x, &y), &z)| Point::new(x, y, z))
        .collect())
}
