use anyhow::{Context, Result, ensure};
use std::fs;
use std::path::Path;

/// Renders a time value the way the solver names its output folders.
///
/// The shortest decimal representation is used, without exponent and without a
/// trailing `.0`: `50.0 -> "50"`, `50.05 -> "50.05"`.
pub fn time_to_str(time: f64) -> String {
    let s = format!("{}", time);
    match s.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => s,
    }
}

/// Returns the saved time values found as sub-directories of `dir`.
///
/// Values are sorted, restricted to the closed interval `limits` and thinned
/// to every `stride`-th one. Entries whose name is not a number are ignored.
pub fn saved_times(dir: &Path, limits: (f64, f64), stride: usize) -> Result<Vec<f64>> {
    ensure!(stride > 0, "stride must be at least 1");

    let mut times = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to list directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        match name.to_string_lossy().parse::<f64>() {
            Ok(t) => times.push(t),
            Err(_) => log::debug!("skipping non-time entry {:?} in {}", name, dir.display()),
        }
    }

    Ok(filter_times(times, limits, stride))
}

/// Sorts, windows and thins a list of time values.
pub(crate) fn filter_times(mut times: Vec<f64>, limits: (f64, f64), stride: usize) -> Vec<f64> {
    times.sort_by(f64::total_cmp);
    times
        .into_iter()
        .filter(|&t| t >= limits.0 && t <= limits.1)
        .step_by(stride.max(1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_time_to_str() {
        assert_eq!(time_to_str(50.0), "50");
        assert_eq!(time_to_str(50.05), "50.05");
        assert_eq!(time_to_str(0.0), "0");
        assert_eq!(time_to_str(100.5), "100.5");
        assert_eq!(time_to_str(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(time_to_str(1e-7), "0.0000001");
    }

    #[test]
    fn test_saved_times() -> Result<()> {
        let dir = tempdir()?;
        for name in ["50", "50.5", "51", "100", "2", "constant"] {
            fs::create_dir(dir.path().join(name))?;
        }
        fs::write(dir.path().join("75"), "not a directory")?;

        let all = saved_times(dir.path(), (0.0, f64::INFINITY), 1)?;
        assert_eq!(all, vec![2.0, 50.0, 50.5, 51.0, 100.0]);

        let window = saved_times(dir.path(), (50.0, 100.0), 2)?;
        assert_eq!(window, vec![50.0, 51.0]);

        Ok(())
    }

    #[test]
    fn test_saved_times_rejects_zero_stride() {
        let dir = tempdir().unwrap();
        assert!(saved_times(dir.path(), (0.0, 1.0), 0).is_err());
    }
}
