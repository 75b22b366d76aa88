//! Vector utility functions like linspace(), nanmean(), take()

/// `num` evenly spaced values over the closed interval `[start, end]`.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut v: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            v[num - 1] = end;
            v
        }
    }
}

/// Mean of the values that are not NaN. Returns NaN if there are none.
pub fn nanmean(vec: &[f64]) -> f64 {
    let (sum, count) = vec
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Applies an index permutation: `out[i] = v[indices[i]]`.
pub fn take<T: Clone>(v: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| v[i].clone()).collect()
}
