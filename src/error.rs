//! Validation errors raised by the post-processing pipeline.
//!
//! Library functions return `anyhow::Result`; these variants are the typed
//! part of it, so callers can `downcast_ref::<PostError>()` when they need to
//! tell a malformed export apart from an I/O failure.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostError {
    /// Point count is not a multiple of the number of distinct spanwise positions.
    #[error("{points} points cannot be split evenly into {sections} spanwise sections")]
    UnevenSections { points: usize, sections: usize },

    /// One spanwise group does not hold the expected number of points.
    #[error("section {section} (z = {z}) holds {actual} points, expected {expected}")]
    SectionSize {
        section: usize,
        z: f64,
        expected: usize,
        actual: usize,
    },

    /// Some requested time instants were never found in the source.
    #[error("{source_name}: {} requested instant(s) not found: {}", missing.len(), missing.join(", "))]
    MissingInstants {
        source_name: String,
        missing: Vec<String>,
    },

    /// A raw data row has fewer columns than required.
    #[error("{}: line {line} has {actual} column(s), expected {expected}", path.display())]
    ColumnCount {
        path: PathBuf,
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// Two arrays that must be parallel have different lengths.
    #[error("{what}: length {actual}, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("{what} is empty")]
    EmptyInput { what: String },
}
