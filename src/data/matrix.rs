//! Delimited text matrices and label vectors
//!
//! Files hold one point per line with values separated by commas, tabs or
//! spaces. Blank lines and lines starting with `#` are skipped, and a first
//! line that is mostly non-numeric is taken as a header. In memory a matrix
//! is transposed so that every column is one point.

use crate::core::{Result, SVMError};
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Load a matrix from a file
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let file = File::open(path).map_err(SVMError::IoError)?;
    read_matrix(BufReader::new(file))
}

/// Read a matrix, one point per line
pub fn read_matrix<R: BufRead>(reader: R) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut width = None;
    let mut points = 0;
    let mut first_data_line = true;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(SVMError::IoError)?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if first_data_line {
            first_data_line = false;
            if is_header_line(line) {
                continue;
            }
        }

        let row = parse_values(line).map_err(|e| {
            SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
        })?;

        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(SVMError::ParseError(format!(
                    "Line {} has {} values, expected {}",
                    line_num + 1,
                    row.len(),
                    w
                )));
            }
            Some(_) => {}
        }

        values.extend(row);
        points += 1;
    }

    let Some(dim) = width else {
        return Err(SVMError::EmptyDataset);
    };

    let by_point = Array2::from_shape_vec((points, dim), values)
        .map_err(|e| SVMError::InvalidDataset(e.to_string()))?;
    Ok(by_point.reversed_axes())
}

/// Load integer labels from a file
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Array1<usize>> {
    let file = File::open(path).map_err(SVMError::IoError)?;
    read_labels(BufReader::new(file))
}

/// Read labels laid out either one per line or all on one line
pub fn read_labels<R: BufRead>(reader: R) -> Result<Array1<usize>> {
    let mut labels = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(SVMError::IoError)?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for token in split_fields(line) {
            let label = parse_label(token).map_err(|e| {
                SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            labels.push(label);
        }
    }

    if labels.is_empty() {
        return Err(SVMError::EmptyDataset);
    }

    Ok(Array1::from_vec(labels))
}

/// Write labels to a file, one per line
pub fn save_labels<P: AsRef<Path>>(path: P, labels: &Array1<usize>) -> Result<()> {
    let file = File::create(path).map_err(SVMError::IoError)?;
    let mut writer = BufWriter::new(file);
    write_labels(&mut writer, labels)?;
    writer.flush().map_err(SVMError::IoError)
}

pub fn write_labels<W: Write>(writer: &mut W, labels: &Array1<usize>) -> Result<()> {
    for label in labels {
        writeln!(writer, "{label}").map_err(SVMError::IoError)?;
    }
    Ok(())
}

/// Write a matrix to a file, one column (point) per line
pub fn save_matrix<P: AsRef<Path>>(path: P, matrix: &Array2<f64>) -> Result<()> {
    let file = File::create(path).map_err(SVMError::IoError)?;
    let mut writer = BufWriter::new(file);
    write_matrix(&mut writer, matrix)?;
    writer.flush().map_err(SVMError::IoError)
}

pub fn write_matrix<W: Write>(writer: &mut W, matrix: &Array2<f64>) -> Result<()> {
    for column in matrix.columns() {
        let line = column
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{line}").map_err(SVMError::IoError)?;
    }
    Ok(())
}

/// Convert a numeric value into a class label
pub fn label_from_value(value: f64) -> Result<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(SVMError::InvalidDataset(format!(
            "label {value} is not a non-negative integer"
        )));
    }
    Ok(value as usize)
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|field| !field.is_empty())
}

fn parse_values(line: &str) -> Result<Vec<f64>> {
    split_fields(line)
        .enumerate()
        .map(|(idx, field)| {
            field.parse::<f64>().map_err(|_| {
                SVMError::ParseError(format!("Invalid value at column {}: {}", idx + 1, field))
            })
        })
        .collect()
}

fn parse_label(token: &str) -> Result<usize> {
    if let Ok(label) = token.parse::<usize>() {
        return Ok(label);
    }
    let value = token
        .parse::<f64>()
        .map_err(|_| SVMError::ParseError(format!("Invalid label: {token}")))?;
    label_from_value(value)
}

/// A line counts as a header when most of its fields are not numbers
fn is_header_line(line: &str) -> bool {
    let fields: Vec<&str> = split_fields(line).collect();
    let non_numeric = fields
        .iter()
        .filter(|field| field.parse::<f64>().is_err())
        .count();
    non_numeric * 2 > fields.len()
}
