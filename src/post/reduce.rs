//! Time averaging of raw samples over a list of saved instants.
//!
//! Fields are accumulated as running sums in the order the instants were
//! requested and divided by the number of instants found at the end. Both
//! source backends visit members in request order, so they produce bit-identical
//! averages from identical raw bytes.

use crate::error::PostError;
use crate::io::{ColumnSpec, Coverage, Member, RawSample, SampleSource};
use anyhow::Result;

/// Time-averaged value columns, with the coordinates of the first instant read.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAverage {
    pub coords: Vec<Vec<f64>>,
    pub values: Vec<Vec<f64>>,
    /// Number of instants that contributed.
    pub count: usize,
}

/// Running sums of value columns. Shape is fixed by the first sample.
struct Accumulator {
    coords: Vec<Vec<f64>>,
    sums: Vec<Vec<f64>>,
    count: usize,
}

impl Accumulator {
    fn start(first: RawSample) -> Self {
        Self {
            coords: first.coords,
            sums: first.values,
            count: 1,
        }
    }

    fn add(mut self, sample: RawSample) -> Result<Self> {
        if sample.values.len() != self.sums.len() {
            return Err(PostError::LengthMismatch {
                what: format!("number of value columns at t = {}", sample.time),
                expected: self.sums.len(),
                actual: sample.values.len(),
            }
            .into());
        }
        for (sum, col) in self.sums.iter_mut().zip(&sample.values) {
            if col.len() != sum.len() {
                return Err(PostError::LengthMismatch {
                    what: format!("field length at t = {}", sample.time),
                    expected: sum.len(),
                    actual: col.len(),
                }
                .into());
            }
            for (s, v) in sum.iter_mut().zip(col) {
                *s += v;
            }
        }
        self.count += 1;
        Ok(self)
    }

    fn finish(self) -> TimeAverage {
        let n = self.count as f64;
        let values = self
            .sums
            .into_iter()
            .map(|col| col.into_iter().map(|s| s / n).collect())
            .collect();
        TimeAverage {
            coords: self.coords,
            values,
            count: self.count,
        }
    }
}

fn fold(acc: Option<Accumulator>, sample: RawSample) -> Result<Option<Accumulator>> {
    Ok(Some(match acc {
        None => Accumulator::start(sample),
        Some(acc) => acc.add(sample)?,
    }))
}

fn finish(acc: Option<Accumulator>, what: &str) -> Result<TimeAverage> {
    acc.map(Accumulator::finish).ok_or_else(|| {
        PostError::EmptyInput {
            what: what.to_string(),
        }
        .into()
    })
}

fn require_times(times: &[f64], source: &SampleSource) -> Result<()> {
    if times.is_empty() {
        return Err(PostError::EmptyInput {
            what: format!("time list for {}", source.describe()),
        }
        .into());
    }
    Ok(())
}

/// Averages the columns of `spec` over `times`.
pub fn time_average(
    source: &SampleSource,
    times: &[f64],
    spec: &ColumnSpec,
    coverage: Coverage,
) -> Result<TimeAverage> {
    time_average_with(source, times, spec, coverage, |_, sample| Ok(sample))
}

/// Averages the columns of `spec` over `times`, passing every sample through
/// `transform(index, sample)` before it is accumulated.
///
/// `index` counts the samples actually found, starting at 0. The transform
/// must not change the shape of the sample.
pub fn time_average_with<F>(
    source: &SampleSource,
    times: &[f64],
    spec: &ColumnSpec,
    coverage: Coverage,
    mut transform: F,
) -> Result<TimeAverage>
where
    F: FnMut(usize, RawSample) -> Result<RawSample>,
{
    require_times(times, source)?;
    log::info!(
        "averaging {} over {} instant(s) from {}",
        spec.file_name,
        times.len(),
        source.describe()
    );

    let members: Vec<Member> = times
        .iter()
        .map(|&t| Member::new(t, spec.file_name.clone()))
        .collect();

    let mut acc: Option<Accumulator> = None;
    let mut found = 0;
    source.scan(&members, coverage, |i, text| {
        let member = &members[i];
        let sample = spec.parse(member.time, text, &source.origin(member))?;
        log::debug!("t = {}: {} point(s)", member.time, sample.len());
        let sample = transform(found, sample)?;
        found += 1;
        acc = fold(acc.take(), sample)?;
        Ok(())
    })?;

    finish(acc, &format!("{} over the requested times", spec.file_name))
}

/// Averages several file families over the same `times` in one scan.
///
/// Returns one average per spec, in the order given.
pub fn time_average_many(
    source: &SampleSource,
    times: &[f64],
    specs: &[ColumnSpec],
    coverage: Coverage,
) -> Result<Vec<TimeAverage>> {
    require_times(times, source)?;
    if specs.is_empty() {
        return Ok(Vec::new());
    }
    log::info!(
        "averaging {} file(s) over {} instant(s) from {}",
        specs.len(),
        times.len(),
        source.describe()
    );

    let members: Vec<Member> = times
        .iter()
        .flat_map(|&t| specs.iter().map(move |s| Member::new(t, s.file_name.clone())))
        .collect();

    let mut accs: Vec<Option<Accumulator>> = specs.iter().map(|_| None).collect();
    source.scan(&members, coverage, |i, text| {
        let member = &members[i];
        let k = i % specs.len();
        let sample = specs[k].parse(member.time, text, &source.origin(member))?;
        accs[k] = fold(accs[k].take(), sample)?;
        Ok(())
    })?;

    accs.into_iter()
        .zip(specs)
        .map(|(acc, spec)| finish(acc, &format!("{} over the requested times", spec.file_name)))
        .collect()
}
