//! Motion clip: typed JSON document and per-frame accessors.
//!
//! A motion file is a list of fixed-schema 44-value frames:
//!
//! ```text
//! index  0      duration of the timestep
//! index  1..4   root position (x, y, z)
//! index  4..8   root rotation quaternion (w, x, y, z)
//! index  8..12  chest rotation
//! index 12..16  neck rotation
//! index 16..20  right hip rotation
//! index 20      right knee angle (radians)
//! index 21..25  right ankle rotation
//! index 25..29  right shoulder rotation
//! index 29      right elbow angle (radians)
//! index 30..34  left hip rotation
//! index 34      left knee angle (radians)
//! index 35..39  left ankle rotation
//! index 39..43  left shoulder rotation
//! index 43      left elbow angle (radians)
//! ```
//!
//! Arity is validated at the parse boundary; a frame with the wrong value
//! count is fatal for the file. Frames are immutable once parsed.

use cgmath::{Quaternion, Vector3};
use serde::Deserialize;

use crate::error::{ConvertError, ConvertResult};

/// Number of values in a motion frame.
pub const FRAME_LEN: usize = 44;

/// Top-level motion document.
#[derive(Debug, Deserialize)]
pub struct MotionDoc {
    /// Raw frame arrays, validated into [`MotionFrame`]s.
    #[serde(rename = "Frames")]
    pub frames: Vec<Vec<f64>>,
}

/// One validated motion frame.
#[derive(Debug, Clone, Copy)]
pub struct MotionFrame {
    values: [f64; FRAME_LEN],
}

impl MotionFrame {
    /// Validates a raw value array into a frame.
    pub fn from_values(index: usize, values: &[f64]) -> ConvertResult<Self> {
        let values: [f64; FRAME_LEN] = values.try_into().map_err(|_| {
            ConvertError::malformed_record(
                "frame",
                index,
                format!("expected {} values, found {}", FRAME_LEN, values.len()),
            )
        })?;
        Ok(Self { values })
    }

    fn quat_at(&self, offset: usize) -> Quaternion<f64> {
        // Stored (w, x, y, z); cgmath takes the scalar first as well.
        Quaternion::new(
            self.values[offset],
            self.values[offset + 1],
            self.values[offset + 2],
            self.values[offset + 3],
        )
    }

    /// Duration of this timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.values[0]
    }

    /// Root position.
    pub fn root_pos(&self) -> Vector3<f64> {
        Vector3::new(self.values[1], self.values[2], self.values[3])
    }

    /// Root rotation.
    pub fn root_quat(&self) -> Quaternion<f64> {
        self.quat_at(4)
    }

    /// Chest rotation.
    pub fn chest_quat(&self) -> Quaternion<f64> {
        self.quat_at(8)
    }

    /// Neck rotation.
    pub fn neck_quat(&self) -> Quaternion<f64> {
        self.quat_at(12)
    }

    /// Right hip rotation.
    pub fn right_hip_quat(&self) -> Quaternion<f64> {
        self.quat_at(16)
    }

    /// Right knee angle in radians.
    pub fn right_knee(&self) -> f64 {
        self.values[20]
    }

    /// Right ankle rotation.
    pub fn right_ankle_quat(&self) -> Quaternion<f64> {
        self.quat_at(21)
    }

    /// Right shoulder rotation.
    pub fn right_shoulder_quat(&self) -> Quaternion<f64> {
        self.quat_at(25)
    }

    /// Right elbow angle in radians.
    pub fn right_elbow(&self) -> f64 {
        self.values[29]
    }

    /// Left hip rotation.
    pub fn left_hip_quat(&self) -> Quaternion<f64> {
        self.quat_at(30)
    }

    /// Left knee angle in radians.
    pub fn left_knee(&self) -> f64 {
        self.values[34]
    }

    /// Left ankle rotation.
    pub fn left_ankle_quat(&self) -> Quaternion<f64> {
        self.quat_at(35)
    }

    /// Left shoulder rotation.
    pub fn left_shoulder_quat(&self) -> Quaternion<f64> {
        self.quat_at(39)
    }

    /// Left elbow angle in radians.
    pub fn left_elbow(&self) -> f64 {
        self.values[43]
    }
}

/// A parsed motion clip: the frame sequence of one input file.
#[derive(Debug, Clone)]
pub struct MotionClip {
    /// Frames in recorded order.
    pub frames: Vec<MotionFrame>,
}

impl MotionClip {
    /// Parses a motion JSON document, validating every frame's arity.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        let doc: MotionDoc = serde_json::from_str(text)?;
        let frames = doc
            .frames
            .iter()
            .enumerate()
            .map(|(index, values)| MotionFrame::from_values(index, values))
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(Self { frames })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if the clip has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Timestep duration, taken from the first frame.
    pub fn frame_time(&self) -> ConvertResult<f64> {
        match self.frames.first() {
            Some(frame) => Ok(frame.dt()),
            None => Err(ConvertError::EmptyMotion),
        }
    }

    /// Per-loop root displacement on the ground plane, used to tile the clip
    /// continuously when the output is repeated: the clip's net travel plus
    /// one extrapolated frame step, `2*last - first - second_last`.
    pub fn loop_offset(&self) -> (f64, f64) {
        if self.frames.len() < 2 {
            return (0.0, 0.0);
        }
        let first = self.frames[0].root_pos();
        let last = self.frames[self.frames.len() - 1].root_pos();
        let second_last = self.frames[self.frames.len() - 2].root_pos();
        (
            2.0 * last.x - first.x - second_last.x,
            2.0 * last.z - first.z - second_last.z,
        )
    }
}
