//! Optional per-motion side files.
//!
//! Two plain-text formats ride alongside a motion file: velocity files
//! (three whitespace-separated numbers per line, one line per frame) and
//! precomputed heading files (a single number per line). Both are optional;
//! a missing file is not an error. A present file with a malformed line is
//! fatal for the input file it belongs to, like any other malformed motion
//! record.

use crate::error::{ConvertError, ConvertResult};

/// Side-channel data resolved for one motion file. Every field defaults to
/// absent; missing velocity files zero-fill their channels and a missing
/// heading file falls back to in-process extraction.
#[derive(Debug, Clone, Default)]
pub struct SideChannels {
    /// Precomputed heading override, one value per frame.
    pub heading: Option<Vec<f64>>,
    /// Expected center-of-mass velocity, one vector per frame.
    pub expected_velocity: Option<Vec<[f64; 3]>>,
    /// Actual center-of-mass velocity, one vector per frame.
    pub actual_velocity: Option<Vec<[f64; 3]>>,
}

/// Parses a velocity side file: three numbers per non-blank line.
pub fn parse_vector_file(text: &str, source_name: &str) -> ConvertResult<Vec<[f64; 3]>> {
    let mut vectors = Vec::new();
    for (index, line) in non_blank_lines(text) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(ConvertError::malformed_record(
                source_name,
                index,
                format!("expected 3 values, found {}", fields.len()),
            ));
        }
        let mut vector = [0.0; 3];
        for (slot, field) in vector.iter_mut().zip(&fields) {
            *slot = parse_number(field, source_name, index)?;
        }
        vectors.push(vector);
    }
    Ok(vectors)
}

/// Parses a heading side file: one number per non-blank line.
pub fn parse_heading_file(text: &str, source_name: &str) -> ConvertResult<Vec<f64>> {
    let mut values = Vec::new();
    for (index, line) in non_blank_lines(text) {
        values.push(parse_number(line, source_name, index)?);
    }
    Ok(values)
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .map(str::trim)
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
}

fn parse_number(field: &str, source_name: &str, index: usize) -> ConvertResult<f64> {
    field.parse::<f64>().map_err(|_| {
        ConvertError::malformed_record(source_name, index, format!("not a number: '{field}'"))
    })
}
