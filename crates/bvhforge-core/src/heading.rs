//! Heading extraction, unwrapping, and smoothing.
//!
//! The heading is the signed rotation of the character's root about the
//! vertical axis. Per frame it is extracted by rotating a horizontal
//! reference vector through the root quaternion, flattening the result onto
//! the ground plane, and measuring the signed angle between the two. The
//! per-frame principal values are then unwrapped into a continuous series
//! and optionally run through an exponential moving average; the smoothed
//! series is what a follow camera tracks, and the difference between the two
//! is the residual the root joint keeps.

use cgmath::{InnerSpace, Quaternion, Rotation, Vector3};
use serde::{Deserialize, Serialize};

/// Horizontal reference axis the heading is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeadingAxis {
    /// The character's forward direction (+Z).
    #[default]
    Forward,
    /// The character's lateral-right direction (+X), for clips where the
    /// forward axis spends too much time near vertical.
    Lateral,
}

impl HeadingAxis {
    /// The reference unit vector for this axis.
    pub fn reference(self) -> Vector3<f64> {
        match self {
            HeadingAxis::Forward => Vector3::new(0.0, 0.0, 1.0),
            HeadingAxis::Lateral => Vector3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Extracts the principal-valued heading of `q` in degrees, in (-180, 180].
///
/// A root orientation pointing the reference axis straight up or down has no
/// meaningful heading; the flattened vector degenerates and the result is
/// unreliable there. Not handled specially.
pub fn extract_heading(q: Quaternion<f64>, axis: HeadingAxis) -> f64 {
    let reference = axis.reference();
    let rotated = q.rotate_vector(reference);
    let flat = Vector3::new(rotated.x, 0.0, rotated.z).normalize();
    let sin = reference.cross(flat).y;
    let cos = reference.dot(flat);
    sin.atan2(cos).to_degrees()
}

/// Unwraps a principal-valued heading series into a continuous one.
///
/// A running offset starts at 0 and moves in whole turns whenever the next
/// raw value would jump more than 180 degrees relative to the previous
/// unwrapped value. The output has no adjacent-frame difference larger than
/// 180 degrees in magnitude.
pub fn unwrap_headings(raw: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(raw.len());
    let mut offset = 0.0;
    for (i, &value) in raw.iter().enumerate() {
        if i > 0 {
            let previous = unwrapped[i - 1];
            if value + offset - previous > 180.0 {
                offset -= 360.0;
            }
            if value + offset - previous < -180.0 {
                offset += 360.0;
            }
        }
        unwrapped.push(value + offset);
    }
    unwrapped
}

/// Exponential moving average over an unwrapped heading series.
///
/// `smoothed[0] = unwrapped[0]`, then
/// `smoothed[i] = smoothed[i-1] + factor * (unwrapped[i] - smoothed[i-1])`.
/// A factor of 1 reproduces the input exactly; as the factor approaches 0
/// the output approaches the constant first sample.
pub fn smooth_headings(unwrapped: &[f64], factor: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(unwrapped.len());
    let mut current = match unwrapped.first() {
        Some(&first) => first,
        None => return smoothed,
    };
    smoothed.push(current);
    for &expected in &unwrapped[1..] {
        current += factor * (expected - current);
        smoothed.push(current);
    }
    smoothed
}

/// The per-file heading series: unwrapped values and their smoothed
/// companion, one of each per frame.
#[derive(Debug, Clone)]
pub struct HeadingSeries {
    /// Continuous (unwrapped) heading in degrees.
    pub unwrapped: Vec<f64>,
    /// Smoothed heading; equals `unwrapped` when smoothing is disabled.
    pub smoothed: Vec<f64>,
}

impl HeadingSeries {
    /// Builds the series from raw principal-valued headings. `smoothing` is
    /// the EMA factor, or `None` to disable smoothing. Unwrapping an
    /// already-continuous series is a no-op, so precomputed heading files
    /// can be fed through here unchanged.
    pub fn from_raw(raw: &[f64], smoothing: Option<f64>) -> Self {
        let unwrapped = unwrap_headings(raw);
        let smoothed = match smoothing {
            Some(factor) => smooth_headings(&unwrapped, factor),
            None => unwrapped.clone(),
        };
        Self { unwrapped, smoothed }
    }

    /// Builds the series by extracting the heading of each root quaternion.
    pub fn from_quaternions<I>(quats: I, axis: HeadingAxis, smoothing: Option<f64>) -> Self
    where
        I: IntoIterator<Item = Quaternion<f64>>,
    {
        let raw: Vec<f64> = quats
            .into_iter()
            .map(|q| extract_heading(q, axis))
            .collect();
        Self::from_raw(&raw, smoothing)
    }

    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.unwrapped.len()
    }

    /// True if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.unwrapped.is_empty()
    }
}
