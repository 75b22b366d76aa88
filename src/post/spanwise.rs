use crate::Point;
use crate::error::PostError;
use crate::geom::planar::Point2;
use anyhow::Result;
use ndarray::{Array2, Axis};

/// Number of distinct `z` values in a point set.
pub fn count_sections(points: &[Point]) -> usize {
    let mut z: Vec<f64> = points.iter().map(|p| p.z).collect();
    z.sort_by(f64::total_cmp);
    z.dedup();
    z.len()
}

/// Averages a field across spanwise sections.
///
/// Points must already be grouped contiguously by section (section-major):
/// all `M` points of section 0, then all of section 1, and so on. A block of
/// `M` points mixing several `z` values is rejected. Position `k` of every
/// section is assumed to be the same in-plane location.
///
/// Returns the in-plane coordinates of the first section and the `M` averages.
pub fn spanwise_average(points: &[Point], values: &[f64]) -> Result<(Vec<Point2>, Vec<f64>)> {
    if points.is_empty() {
        return Err(PostError::EmptyInput {
            what: "spanwise average".to_string(),
        }
        .into());
    }
    if values.len() != points.len() {
        return Err(PostError::LengthMismatch {
            what: "spanwise field".to_string(),
            expected: points.len(),
            actual: values.len(),
        }
        .into());
    }

    let num_sections = count_sections(points);
    if points.len() % num_sections != 0 {
        return Err(PostError::UnevenSections {
            points: points.len(),
            sections: num_sections,
        }
        .into());
    }
    let per_section = points.len() / num_sections;
    for (section, block) in points.chunks(per_section).enumerate() {
        let z = block[0].z;
        let actual = block.iter().filter(|p| p.z == z).count();
        if actual != per_section {
            return Err(PostError::SectionSize {
                section,
                z,
                expected: per_section,
                actual,
            }
            .into());
        }
    }

    let table = Array2::from_shape_vec((num_sections, per_section), values.to_vec())?;
    let mean = table
        .mean_axis(Axis(0))
        .ok_or_else(|| anyhow::anyhow!("cannot average over zero sections"))?;

    let xy = points[..per_section].iter().map(|p| p.xy()).collect();
    Ok((xy, mean.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(s: usize, m: usize) -> Vec<Point> {
        let mut pts = Vec::with_capacity(s * m);
        for k in 0..s {
            for i in 0..m {
                pts.push(Point::new(i as f64, (i * i) as f64, k as f64 * 0.25));
            }
        }
        pts
    }

    #[test]
    fn test_constant_field() -> Result<()> {
        let pts = sections(5, 7);
        let values = vec![3.7; pts.len()];
        let (xy, mean) = spanwise_average(&pts, &values)?;
        assert_eq!(xy.len(), 7);
        assert!(mean.iter().all(|v| (v - 3.7).abs() < 1e-12));
        Ok(())
    }

    #[test]
    fn test_section_index_field() -> Result<()> {
        let (s, m) = (4, 6);
        let pts = sections(s, m);
        let values: Vec<f64> = (0..s * m).map(|i| (i / m) as f64).collect();
        let (_, mean) = spanwise_average(&pts, &values)?;
        assert_eq!(mean, vec![1.5; m]);
        Ok(())
    }

    #[test]
    fn test_coordinates_from_first_section() -> Result<()> {
        let pts = sections(2, 3);
        let (xy, _) = spanwise_average(&pts, &[0.0; 6])?;
        assert_eq!(
            xy,
            vec![Point2::new(0., 0.), Point2::new(1., 1.), Point2::new(2., 4.)]
        );
        Ok(())
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let pts = sections(2, 3);
        assert!(spanwise_average(&pts, &[1.0; 5]).is_err());
        assert!(spanwise_average(&pts[..5], &[1.0; 5]).is_err());
        assert!(spanwise_average(&[], &[]).is_err());
    }

    #[test]
    fn test_rejects_interleaved_sections() {
        let pts: Vec<Point> = (0..4)
            .map(|i| Point::new(i as f64, 0.0, (i % 2) as f64))
            .collect();
        let err = spanwise_average(&pts, &[1.0; 4]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PostError>(),
            Some(&PostError::SectionSize {
                section: 0,
                z: 0.0,
                expected: 2,
                actual: 1
            })
        );
    }
}
