//! Post-processing settings, read from JSON.
//!
//! Every field has a default, so a config file only needs the values that
//! differ for a given case.

use crate::io::Coverage;
use crate::post::coefficients::FlowReference;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Closed time window. A missing `end` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWindow {
    pub start: f64,
    pub end: Option<f64>,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: None,
        }
    }
}

impl TimeWindow {
    pub fn limits(&self) -> (f64, f64) {
        (self.start, self.end.unwrap_or(f64::INFINITY))
    }
}

/// Centerline wake profile: `(x, z)` slice at `y = 0`, averaged over `z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterlineConfig {
    pub xlims: (f64, f64),
    pub zlims: (f64, f64),
    pub nx: usize,
    pub nz: usize,
}

impl Default for CenterlineConfig {
    fn default() -> Self {
        Self {
            xlims: (0.0, 10.0),
            zlims: (-1.6, 1.6),
            nx: 200,
            nz: 100,
        }
    }
}

/// Vertical velocity profiles: `(y, z)` slices at fixed `x`, averaged over `z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    pub x_locations: Vec<f64>,
    pub ylims: (f64, f64),
    pub zlims: (f64, f64),
    pub ny: usize,
    pub nz: usize,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            x_locations: vec![1.06, 1.54, 2.02, 4.0, 7.0, 10.0],
            ylims: (-3.0, 3.0),
            zlims: (-1.6, 1.6),
            ny: 200,
            nz: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub flow: FlowReference,
    pub time: TimeWindow,
    /// Keep every `stride`-th saved time.
    pub stride: usize,
    pub coverage: Coverage,
    pub centerline: CenterlineConfig,
    pub profiles: ProfilesConfig,
    /// Neighbours on each side a lift peak must exceed.
    pub strouhal_order: usize,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            flow: FlowReference::default(),
            time: TimeWindow::default(),
            stride: 1,
            coverage: Coverage::Strict,
            centerline: CenterlineConfig::default(),
            profiles: ProfilesConfig::default(),
            strouhal_order: 10,
        }
    }
}

impl PostConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config from: {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write config to: {}", path.display()))?;
        Ok(())
    }
}
