//! bvhforge core
//!
//! This crate converts recorded character motion (a skeleton hierarchy plus
//! per-frame quaternion pose data, both JSON) into BVH animation documents.
//!
//! # Overview
//!
//! The conversion runs per input file, in four stages:
//!
//! - **Rotation math** - quaternion to Euler conversion under two axis
//!   orderings; ZYX for per-joint channels, YZX for the camera-relative
//!   heading decomposition
//! - **Heading** - extract the root yaw per frame, unwrap it into a
//!   continuous series, and smooth it with an exponential moving average
//! - **Frame assembly** - lay out base, root, limb, velocity, and camera
//!   channel values per frame according to the selected camera mode
//! - **BVH serialization** - render the hierarchy block and the motion block
//!
//! The channel order the assembler emits and the channel order the
//! serializer declares are the same depth-first walk of the skeleton; the
//! pipeline checks the counts agree before rendering.
//!
//! # Example
//!
//! ```ignore
//! use bvhforge_core::{convert_clip, ConvertOptions, MotionClip, SideChannels, Skeleton};
//!
//! let skeleton = Skeleton::from_json(&character_json)?;
//! let clip = MotionClip::from_json(&motion_json)?;
//! let bvh = convert_clip(&skeleton, &clip, &SideChannels::default(), &ConvertOptions::default())?;
//! std::fs::write("walk.bvh", bvh)?;
//! ```
//!
//! # Crate Structure
//!
//! - [`pipeline`] - per-file conversion entry points
//! - [`character`] - character JSON documents and the joint tree
//! - [`motion`] - motion JSON documents and the fixed frame schema
//! - [`rotation`] - quaternion/Euler math
//! - [`heading`] - heading extraction, unwrapping, smoothing
//! - [`assemble`] - camera modes and per-frame channel layout
//! - [`bvh`] - BVH text rendering
//! - [`sidecar`] - optional velocity and heading side files

pub mod assemble;
pub mod bvh;
pub mod character;
pub mod error;
pub mod heading;
pub mod motion;
pub mod pipeline;
pub mod rotation;
pub mod sidecar;

// Re-export the main entry points
pub use assemble::{CameraMode, ConvertOptions, UNIT_SCALE};
pub use character::{Joint, JointRecord, Skeleton};
pub use error::{ConvertError, ConvertResult};
pub use heading::{HeadingAxis, HeadingSeries};
pub use motion::{MotionClip, MotionFrame, FRAME_LEN};
pub use pipeline::{convert_clip, heading_report, CAMERA_JOINT};
pub use sidecar::SideChannels;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::channel_count;

    fn character_json() -> String {
        let limb_names = [
            "root",
            "chest",
            "neck",
            "right_shoulder",
            "right_elbow",
            "left_shoulder",
            "left_elbow",
            "right_hip",
            "right_knee",
            "right_ankle",
            "left_hip",
            "left_knee",
            "left_ankle",
            "v_goal",
            "v_com",
            "camera",
        ];
        let mut joints = vec![serde_json::json!({
            "ID": 0, "Name": "base", "Type": "none", "Parent": -1,
            "AttachX": 0.0, "AttachY": 0.0, "AttachZ": 0.0
        })];
        for (i, name) in limb_names.iter().enumerate() {
            joints.push(serde_json::json!({
                "ID": i + 1, "Name": name, "Type": "spherical", "Parent": 0,
                "AttachX": 0.0, "AttachY": 0.05, "AttachZ": 0.0
            }));
        }
        serde_json::json!({ "Skeleton": { "Joints": joints } }).to_string()
    }

    fn motion_json(frames: usize) -> String {
        let mut values = vec![0.0; FRAME_LEN];
        values[0] = 1.0 / 30.0;
        for offset in [4, 8, 12, 16, 21, 25, 30, 35, 39] {
            values[offset] = 1.0;
        }
        let frames: Vec<_> = (0..frames)
            .map(|i| {
                let mut v = values.clone();
                v[1] = i as f64 * 0.1;
                v
            })
            .collect();
        serde_json::json!({ "Frames": frames }).to_string()
    }

    #[test]
    fn test_end_to_end_json_to_bvh() {
        let skeleton = Skeleton::from_json(&character_json()).expect("character parses");
        let clip = MotionClip::from_json(&motion_json(4)).expect("motion parses");
        let bvh = convert_clip(
            &skeleton,
            &clip,
            &SideChannels::default(),
            &ConvertOptions::default(),
        )
        .expect("conversion succeeds");

        assert!(bvh.starts_with("HIERARCHY\n"));
        assert!(bvh.contains("MOTION\nFrames: 4\nFrame Time: 0.033333\n"));
        let motion_lines = bvh
            .lines()
            .skip_while(|l| !l.starts_with("Frame Time:"))
            .skip(1)
            .count();
        assert_eq!(motion_lines, 4);
    }

    #[test]
    fn test_declared_channels_match_assembled_values_in_every_mode() {
        let skeleton = Skeleton::from_json(&character_json()).expect("character parses");
        for camera in [
            CameraMode::Null,
            CameraMode::Pos,
            CameraMode::PosY,
            CameraMode::Xz,
            CameraMode::XzY,
            CameraMode::XzYs,
        ] {
            let options = ConvertOptions {
                camera,
                ..ConvertOptions::default()
            };
            let hierarchy = if camera.folds_heading() {
                skeleton.without_leaf(CAMERA_JOINT)
            } else {
                skeleton.clone()
            };
            assert_eq!(
                channel_count(&hierarchy),
                options.channels_per_frame(),
                "mode {camera:?}"
            );
        }
    }

    #[test]
    fn test_motion_lines_have_declared_width() {
        let skeleton = Skeleton::from_json(&character_json()).expect("character parses");
        let clip = MotionClip::from_json(&motion_json(2)).expect("motion parses");
        let options = ConvertOptions {
            camera: CameraMode::Pos,
            ..ConvertOptions::default()
        };
        let bvh = convert_clip(&skeleton, &clip, &SideChannels::default(), &options)
            .expect("conversion succeeds");

        let width = channel_count(&skeleton);
        for line in bvh.lines().skip_while(|l| !l.starts_with("Frame Time:")).skip(1) {
            assert_eq!(line.split(' ').count(), width);
        }
    }

    #[test]
    fn test_heading_report_round_trips_through_side_file() {
        let clip = MotionClip::from_json(&motion_json(3)).expect("motion parses");
        let options = ConvertOptions::default();
        let report = heading_report(&clip, &options).expect("report");
        let parsed =
            sidecar::parse_heading_file(&report, "heading").expect("report parses back");
        assert_eq!(parsed.len(), 3);
    }
}
