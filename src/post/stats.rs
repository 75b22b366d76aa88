//! Descriptive statistics and Strouhal number of force-coefficient signals.

use crate::error::PostError;
use anyhow::{Result, bail, ensure};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub var: f64,
    /// Root mean square of the fluctuation about the mean.
    pub rms: f64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(4);
        write!(
            f,
            "mean={:.prec$} std={:.prec$} var={:.prec$} rms={:.prec$}",
            self.mean,
            self.std,
            self.var,
            self.rms,
            prec = prec
        )
    }
}

/// Samples of `values` whose time lies inside the closed `limits`.
fn window<'a>(times: &'a [f64], values: &'a [f64], limits: (f64, f64)) -> impl Iterator<Item = (f64, f64)> + 'a {
    times
        .iter()
        .zip(values)
        .filter(move |(t, _)| **t >= limits.0 && **t <= limits.1)
        .map(|(&t, &v)| (t, v))
}

/// Statistics of a signal restricted to a time window.
pub fn stats(times: &[f64], values: &[f64], limits: (f64, f64)) -> Result<Stats> {
    if times.len() != values.len() {
        return Err(PostError::LengthMismatch {
            what: "signal".to_string(),
            expected: times.len(),
            actual: values.len(),
        }
        .into());
    }
    let f: Vec<f64> = window(times, values, limits).map(|(_, v)| v).collect();
    if f.is_empty() {
        return Err(PostError::EmptyInput {
            what: format!("signal inside time window [{}, {}]", limits.0, limits.1),
        }
        .into());
    }

    let n = f.len() as f64;
    let mean = f.iter().sum::<f64>() / n;
    let var = f.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Ok(Stats {
        mean,
        std: var.sqrt(),
        var,
        rms: var.sqrt(),
    })
}

/// Indices of relative maxima: samples strictly greater than their `order`
/// neighbours on each side. Near the ends the neighbourhood is clipped.
pub fn peaks(values: &[f64], order: usize) -> Vec<usize> {
    let n = values.len();
    (0..n)
        .filter(|&i| {
            let lo = i.saturating_sub(order);
            let hi = (i + order).min(n.saturating_sub(1));
            (lo..=hi).all(|j| j == i || values[i] > values[j])
        })
        .collect()
}

/// Strouhal number `St = L / (U T)`, with `T` the mean spacing of the peaks
/// of the signal inside the time window.
pub fn strouhal(
    times: &[f64],
    values: &[f64],
    length: f64,
    speed: f64,
    limits: (f64, f64),
    order: usize,
) -> Result<f64> {
    ensure!(order > 0, "peak detection order must be at least 1");
    let (t, f): (Vec<f64>, Vec<f64>) = window(times, values, limits).unzip();

    let idx = peaks(&f, order);
    if idx.len() < 2 {
        bail!(
            "found {} peak(s) in [{}, {}]; at least 2 are needed for a period",
            idx.len(),
            limits.0,
            limits.1
        );
    }
    let period = (t[idx[idx.len() - 1]] - t[idx[0]]) / (idx.len() - 1) as f64;
    log::debug!("{} peak(s), mean period {}", idx.len(), period);
    Ok(length / (speed * period))
}
