//! Per-frame channel-vector assembly.
//!
//! This is the counterpart of the BVH hierarchy walk: the values emitted
//! here, in this exact order, line up one-to-one with the channels the
//! serializer declares. Base (6) and root (6) channels come first, then the
//! twelve limb joints in fixed anatomical order, then the two auxiliary
//! center-of-mass velocity vectors, then - in the camera modes that do not
//! fold the heading into the base joint - one trailing camera-rotation
//! triple. There is no runtime check tying this to the hierarchy; the two
//! sides are kept in lockstep by the contract tests at the crate root.

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::heading::{HeadingAxis, HeadingSeries};
use crate::motion::MotionFrame;
use crate::rotation::{quat_to_euler, reorder_residual, EulerOrder};
use crate::sidecar::SideChannels;

/// Fixed unit-conversion constant applied to every emitted position and
/// offset (simulation units to BVH centimeters).
pub const UNIT_SCALE: f64 = 20.0;

/// How the synthetic base joint absorbs root motion, and where the heading
/// ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Suppress all base motion; the root keeps its full transform.
    Null,
    /// Full translation on the base, rotation untouched.
    Pos,
    /// Translation on the base, heading on the trailing camera channel.
    PosY,
    /// Ground-plane translation on the base, height stays on the root.
    Xz,
    /// Ground-plane translation plus raw heading on the base; the root
    /// keeps the residual rotation.
    XzY,
    /// Ground-plane translation plus smoothed heading on the base; the
    /// root keeps the residual rotation (default).
    #[default]
    XzYs,
}

impl CameraMode {
    /// True when the heading is folded into the base joint's rotation
    /// channels instead of the trailing camera channel.
    pub fn folds_heading(self) -> bool {
        matches!(self, CameraMode::XzY | CameraMode::XzYs)
    }

    /// True when the assembled frame ends with a camera-rotation triple.
    pub fn has_camera_channel(self) -> bool {
        !self.folds_heading()
    }
}

/// Read-only configuration for one conversion run, shared across files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertOptions {
    /// Camera mode.
    #[serde(default)]
    pub camera: CameraMode,
    /// Heading EMA factor in (0, 1].
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: f64,
    /// Whether heading smoothing is applied at all.
    #[serde(default = "default_smoothing")]
    pub smoothing: bool,
    /// Reference axis for heading extraction.
    #[serde(default)]
    pub heading_axis: HeadingAxis,
    /// Number of times the clip is emitted back to back.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    /// Minimum output duration in seconds; when positive, overrides
    /// `repeat` with enough repetitions to cover it.
    #[serde(default)]
    pub duration: f64,
}

fn default_smooth_factor() -> f64 {
    0.05
}

fn default_smoothing() -> bool {
    true
}

fn default_repeat() -> u32 {
    1
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            camera: CameraMode::default(),
            smooth_factor: default_smooth_factor(),
            smoothing: default_smoothing(),
            heading_axis: HeadingAxis::default(),
            repeat: default_repeat(),
            duration: 0.0,
        }
    }
}

impl ConvertOptions {
    /// The EMA factor to hand to the heading series, `None` when smoothing
    /// is disabled.
    pub fn smoothing_factor(&self) -> Option<f64> {
        self.smoothing.then_some(self.smooth_factor)
    }

    /// Number of channel values one assembled frame carries under these
    /// options: base 6 + root 6 + 12 limb joints x 3 + two velocity
    /// vectors, plus the trailing camera triple when present.
    pub fn channels_per_frame(&self) -> usize {
        let mut count = 6 + 6 + 12 * 3 + 3 + 3;
        if self.camera.has_camera_channel() {
            count += 3;
        }
        count
    }
}

/// The residual root rotation left over after `applied` degrees of heading
/// moved to the base joint, as ZYX Euler angles. Computed against the
/// YZX-decomposed yaw of the quaternion itself so that base x residual
/// reconstructs the original orientation exactly.
fn residual_root(frame: &MotionFrame, applied: f64) -> [f64; 3] {
    let [a, yaw, b] = quat_to_euler(frame.root_quat(), EulerOrder::Yzx);
    reorder_residual(yaw - applied, a, b)
}

fn push3(out: &mut Vec<f64>, values: [f64; 3]) {
    out.extend_from_slice(&values);
}

fn side_vector(channel: &Option<Vec<[f64; 3]>>, index: usize) -> [f64; 3] {
    match channel {
        Some(vectors) => vectors[index],
        None => [0.0; 3],
    }
}

/// Assembles the channel vector for frame `index`.
///
/// `root_shift` is an additional unscaled ground-plane offset applied to
/// the root position before unit conversion; repetitions of a looped clip
/// pass their accumulated displacement here so the frames themselves stay
/// immutable.
pub fn assemble_frame(
    frame: &MotionFrame,
    index: usize,
    heading: &HeadingSeries,
    sides: &SideChannels,
    options: &ConvertOptions,
    root_shift: Vector3<f64>,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(options.channels_per_frame());

    let pos = (frame.root_pos() + root_shift) * UNIT_SCALE;
    let full_root = quat_to_euler(frame.root_quat(), EulerOrder::Zyx);

    match options.camera {
        CameraMode::Null => {
            push3(&mut out, [0.0; 3]); // base position
            push3(&mut out, [0.0; 3]); // base rotation
            push3(&mut out, [pos.x, pos.y, pos.z]); // root position
            push3(&mut out, full_root); // root rotation
        }
        CameraMode::Pos | CameraMode::PosY => {
            push3(&mut out, [pos.x, pos.y, pos.z]);
            push3(&mut out, [0.0; 3]);
            push3(&mut out, [0.0; 3]);
            push3(&mut out, full_root);
        }
        CameraMode::Xz => {
            push3(&mut out, [pos.x, 0.0, pos.z]);
            push3(&mut out, [0.0; 3]);
            push3(&mut out, [0.0, pos.y, 0.0]);
            push3(&mut out, full_root);
        }
        CameraMode::XzY => {
            let applied = heading.unwrapped[index];
            push3(&mut out, [pos.x, 0.0, pos.z]);
            push3(&mut out, [0.0, applied, 0.0]);
            push3(&mut out, [0.0, pos.y, 0.0]);
            push3(&mut out, residual_root(frame, applied));
        }
        CameraMode::XzYs => {
            let applied = heading.smoothed[index];
            push3(&mut out, [pos.x, 0.0, pos.z]);
            push3(&mut out, [0.0, applied, 0.0]);
            push3(&mut out, [0.0, pos.y, 0.0]);
            push3(&mut out, residual_root(frame, applied));
        }
    }

    // Limb channels, fixed anatomical order. 1-DoF joints put their angle
    // on the twist channel.
    push3(&mut out, quat_to_euler(frame.chest_quat(), EulerOrder::Zyx));
    push3(&mut out, quat_to_euler(frame.neck_quat(), EulerOrder::Zyx));
    push3(
        &mut out,
        quat_to_euler(frame.right_shoulder_quat(), EulerOrder::Zyx),
    );
    push3(&mut out, [frame.right_elbow().to_degrees(), 0.0, 0.0]);
    push3(
        &mut out,
        quat_to_euler(frame.left_shoulder_quat(), EulerOrder::Zyx),
    );
    push3(&mut out, [frame.left_elbow().to_degrees(), 0.0, 0.0]);
    push3(
        &mut out,
        quat_to_euler(frame.right_hip_quat(), EulerOrder::Zyx),
    );
    push3(&mut out, [frame.right_knee().to_degrees(), 0.0, 0.0]);
    push3(
        &mut out,
        quat_to_euler(frame.right_ankle_quat(), EulerOrder::Zyx),
    );
    push3(
        &mut out,
        quat_to_euler(frame.left_hip_quat(), EulerOrder::Zyx),
    );
    push3(&mut out, [frame.left_knee().to_degrees(), 0.0, 0.0]);
    push3(
        &mut out,
        quat_to_euler(frame.left_ankle_quat(), EulerOrder::Zyx),
    );

    push3(&mut out, side_vector(&sides.expected_velocity, index));
    push3(&mut out, side_vector(&sides.actual_velocity, index));

    match options.camera {
        CameraMode::Null | CameraMode::Pos | CameraMode::Xz => push3(&mut out, [0.0; 3]),
        CameraMode::PosY => push3(&mut out, [0.0, heading.smoothed[index], 0.0]),
        CameraMode::XzY | CameraMode::XzYs => {}
    }

    out
}

/// Assembles the channel vectors for a whole frame sequence.
pub fn assemble_frames(
    frames: &[MotionFrame],
    heading: &HeadingSeries,
    sides: &SideChannels,
    options: &ConvertOptions,
    root_shift: Vector3<f64>,
) -> Vec<Vec<f64>> {
    frames
        .iter()
        .enumerate()
        .map(|(index, frame)| assemble_frame(frame, index, heading, sides, options, root_shift))
        .collect()
}
