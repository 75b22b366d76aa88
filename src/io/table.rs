//! Whitespace- and comma-delimited numeric column tables.
//!
//! Derived-data cache files are written with a `#`-prefixed header and one row
//! per sample. Values are printed with the shortest representation that parses
//! back to the same `f64`, so a save/load cycle is lossless.

use crate::error::PostError;
use anyhow::{Context, Result, ensure};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Iterates over data rows, skipping blank lines and `#` comments.
///
/// Yields the 1-based line number with the row.
fn data_rows(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Extracts the requested whitespace-separated columns from raw text.
///
/// Every row must have more columns than the largest requested index; extra
/// columns are ignored. `origin` is only used for error messages.
pub fn parse_columns(text: &str, usecols: &[usize], origin: &Path) -> Result<Vec<Vec<f64>>> {
    let needed = usecols.iter().max().map_or(0, |&c| c + 1);
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); usecols.len()];

    for (line_no, line) in data_rows(text) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < needed {
            return Err(PostError::ColumnCount {
                path: origin.to_path_buf(),
                line: line_no,
                expected: needed,
                actual: fields.len(),
            }
            .into());
        }
        for (col, &idx) in columns.iter_mut().zip(usecols) {
            let value: f64 = fields[idx].parse().with_context(|| {
                format!(
                    "{}: invalid number {:?} at line {line_no}",
                    origin.display(),
                    fields[idx]
                )
            })?;
            col.push(value);
        }
    }

    Ok(columns)
}

/// Parses every column of a table, requiring the same width on every row.
fn parse_all_columns(text: &str, delimiter: Option<char>, origin: &Path) -> Result<Vec<Vec<f64>>> {
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in data_rows(text) {
        let fields: Vec<&str> = match delimiter {
            Some(d) => line.split(d).map(str::trim).collect(),
            None => line.split_whitespace().collect(),
        };
        if columns.is_empty() {
            columns = vec![Vec::new(); fields.len()];
        }
        if fields.len() != columns.len() {
            return Err(PostError::ColumnCount {
                path: origin.to_path_buf(),
                line: line_no,
                expected: columns.len(),
                actual: fields.len(),
            }
            .into());
        }
        for (col, field) in columns.iter_mut().zip(&fields) {
            col.push(field.parse().with_context(|| {
                format!(
                    "{}: invalid number {:?} at line {line_no}",
                    origin.display(),
                    field
                )
            })?);
        }
    }

    Ok(columns)
}

/// Writes parallel columns as a text table with a one-line header comment.
///
/// Parent directories are created when missing.
pub fn write_table(path: &Path, header: &str, columns: &[&[f64]]) -> Result<()> {
    let nrows = columns.first().map_or(0, |c| c.len());
    for (i, col) in columns.iter().enumerate() {
        ensure!(
            col.len() == nrows,
            "column {i} has {} rows, expected {nrows}",
            col.len()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# {}", header)?;
    for row in 0..nrows {
        let line: Vec<String> = columns.iter().map(|c| format!("{:e}", c[row])).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads back a table written by [`write_table`], one vector per column.
pub fn read_table(path: &Path) -> Result<Vec<Vec<f64>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_all_columns(&text, None, path)
}

/// Reads a comma-delimited numeric table (e.g. digitized literature curves).
pub fn read_delimited(path: &Path, delimiter: char) -> Result<Vec<Vec<f64>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_all_columns(&text, Some(delimiter), path)
}
