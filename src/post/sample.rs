use crate::Point;
use crate::error::PostError;
use anyhow::Result;

/// Surface points with one or more field values attached to each point.
///
/// Nothing is assumed about the order of the points.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSample {
    pub points: Vec<Point>,
    pub values: Vec<Vec<f64>>,
}

impl SurfaceSample {
    pub fn new(points: Vec<Point>, values: Vec<Vec<f64>>) -> Result<Self> {
        for field in &values {
            if field.len() != points.len() {
                return Err(PostError::LengthMismatch {
                    what: "surface field".to_string(),
                    expected: points.len(),
                    actual: field.len(),
                }
                .into());
            }
        }
        Ok(Self { points, values })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values of the `i`-th field.
    pub fn field(&self, i: usize) -> &[f64] {
        &self.values[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_length_checked() {
        let err = SurfaceSample::new(vec![Point::new(0., 0., 0.)], vec![vec![1., 2.]]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PostError>(),
            Some(PostError::LengthMismatch { expected: 1, actual: 2, .. })
        ));
    }
}
