//! Averaging pipeline: time reduction, section reordering, spanwise averaging,
//! normalization and grid interpolation of raw samples.

pub mod coefficients;
pub mod datasets;
pub mod interp;
pub mod reduce;
pub mod reorder;
pub mod sample;
pub mod spanwise;
pub mod stats;
