//! Integrated force history written by the solver's forces function object.
//!
//! Each row holds the time followed by the pressure and viscous force vectors,
//! wrapped in parentheses: `t ((px py pz) (vx vy vz)) ...`. Parentheses are
//! blanked out on a copy of the text before the columns are parsed.

use crate::io::source::{Member, SampleSource};
use crate::io::table::parse_columns;
use anyhow::Result;

/// File name of the force history, stored under the start-time folder `0`.
pub const FORCES_FILE: &str = "forces.dat";

/// Total (pressure + viscous) force components over time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForceHistory {
    pub times: Vec<f64>,
    pub fx: Vec<f64>,
    pub fy: Vec<f64>,
    pub fz: Vec<f64>,
}

impl ForceHistory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Returns a copy of `text` with every parenthesis replaced by a blank.
pub fn strip_parentheses(text: &str) -> String {
    text.chars()
        .map(|c| if c == '(' || c == ')' { ' ' } else { c })
        .collect()
}

/// Parses force-history text, keeping rows with time inside the closed `limits`.
pub fn parse_forces(text: &str, limits: (f64, f64), origin: &std::path::Path) -> Result<ForceHistory> {
    let cleaned = strip_parentheses(text);
    let cols = parse_columns(&cleaned, &[0, 1, 2, 3, 4, 5, 6], origin)?;

    let mut history = ForceHistory::default();
    for i in 0..cols[0].len() {
        let t = cols[0][i];
        if t < limits.0 || t > limits.1 {
            continue;
        }
        history.times.push(t);
        history.fx.push(cols[1][i] + cols[4][i]);
        history.fy.push(cols[2][i] + cols[5][i]);
        history.fz.push(cols[3][i] + cols[6][i]);
    }
    Ok(history)
}

/// Reads the force history from `<root>/0/forces.dat` (directory or archive).
pub fn read_forces(source: &SampleSource, limits: (f64, f64)) -> Result<ForceHistory> {
    let member = Member::new(0.0, FORCES_FILE);
    let text = source.read_text(&member)?;
    let history = parse_forces(&text, limits, &source.origin(&member))?;
    log::info!(
        "read {} force sample(s) from {}",
        history.len(),
        source.describe()
    );
    Ok(history)
}
