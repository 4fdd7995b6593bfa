//! Per-file conversion pipeline.
//!
//! One call per input file, no state shared between files beyond the
//! read-only [`ConvertOptions`]. Heading unwrapping and smoothing are
//! strictly sequential within a file, so frames are processed in recorded
//! order; separate files are independent.

use cgmath::Vector3;

use crate::assemble::{assemble_frames, ConvertOptions};
use crate::bvh::{channel_count, render_bvh};
use crate::character::Skeleton;
use crate::error::{ConvertError, ConvertResult};
use crate::heading::HeadingSeries;
use crate::motion::MotionClip;
use crate::sidecar::SideChannels;

/// Name of the camera marker joint. It is pruned from the hierarchy in
/// camera modes that fold the heading into the base joint, where no
/// trailing camera channel is emitted.
pub const CAMERA_JOINT: &str = "camera";

/// Number of times the clip is emitted, derived from the options: an
/// explicit repeat count, or enough repetitions to cover `duration`
/// seconds when that is set.
pub fn repetitions(clip: &MotionClip, options: &ConvertOptions) -> ConvertResult<u32> {
    if options.duration > 0.0 {
        let clip_seconds = clip.len() as f64 * clip.frame_time()?;
        let reps = (options.duration / clip_seconds).ceil() as u32;
        Ok(reps.max(1))
    } else {
        Ok(options.repeat.max(1))
    }
}

/// The heading series for a clip: the precomputed side file when present,
/// otherwise extracted from the root quaternions.
pub fn heading_series(
    clip: &MotionClip,
    sides: &SideChannels,
    options: &ConvertOptions,
) -> HeadingSeries {
    match &sides.heading {
        Some(raw) => HeadingSeries::from_raw(raw, options.smoothing_factor()),
        None => HeadingSeries::from_quaternions(
            clip.frames.iter().map(|frame| frame.root_quat()),
            options.heading_axis,
            options.smoothing_factor(),
        ),
    }
}

fn check_side_len(found: Option<usize>, expected: usize, source_name: &str) -> ConvertResult<()> {
    match found {
        Some(len) if len != expected => Err(ConvertError::malformed_record(
            source_name,
            len,
            format!("expected {expected} lines, found {len}"),
        )),
        _ => Ok(()),
    }
}

/// Converts one parsed clip to a complete BVH document.
pub fn convert_clip(
    skeleton: &Skeleton,
    clip: &MotionClip,
    sides: &SideChannels,
    options: &ConvertOptions,
) -> ConvertResult<String> {
    let frame_time = clip.frame_time()?;

    check_side_len(sides.heading.as_ref().map(Vec::len), clip.len(), "heading file")?;
    check_side_len(
        sides.expected_velocity.as_ref().map(Vec::len),
        clip.len(),
        "goal velocity file",
    )?;
    check_side_len(
        sides.actual_velocity.as_ref().map(Vec::len),
        clip.len(),
        "com velocity file",
    )?;

    let hierarchy = if options.camera.folds_heading() {
        skeleton.without_leaf(CAMERA_JOINT)
    } else {
        skeleton.clone()
    };
    let declared = channel_count(&hierarchy);
    let assembled = options.channels_per_frame();
    if declared != assembled {
        return Err(ConvertError::ChannelMismatch {
            declared,
            assembled,
        });
    }

    let heading = heading_series(clip, sides, options);
    let reps = repetitions(clip, options)?;
    let (dx, dz) = clip.loop_offset();

    let mut frames = Vec::with_capacity(clip.len() * reps as usize);
    for rep in 0..reps {
        let shift = Vector3::new(rep as f64 * dx, 0.0, rep as f64 * dz);
        frames.extend(assemble_frames(&clip.frames, &heading, sides, options, shift));
    }

    Ok(render_bvh(&hierarchy, &frames, frame_time))
}

/// Produces the unwrapped heading series of a clip as text, one value per
/// line. This is the precomputed-heading format [`SideChannels`] reads back.
pub fn heading_report(clip: &MotionClip, options: &ConvertOptions) -> ConvertResult<String> {
    if clip.is_empty() {
        return Err(ConvertError::EmptyMotion);
    }
    let series = HeadingSeries::from_quaternions(
        clip.frames.iter().map(|frame| frame.root_quat()),
        options.heading_axis,
        None,
    );
    let mut out = String::new();
    for value in &series.unwrapped {
        out.push_str(&format!("{value:.6}\n"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::CameraMode;
    use crate::character::JointRecord;
    use crate::motion::{MotionFrame, FRAME_LEN};
    use pretty_assertions::assert_eq;

    fn record(id: i64, name: &str, parent: i64) -> JointRecord {
        JointRecord {
            id,
            name: name.to_string(),
            kind: "spherical".to_string(),
            parent,
            attach_x: 0.0,
            attach_y: 0.1,
            attach_z: 0.0,
        }
    }

    /// The full recording-format hierarchy: base, six-channel pelvis root,
    /// twelve limb joints, two velocity markers, one camera marker.
    fn full_skeleton() -> Skeleton {
        let names = [
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
        let mut records = vec![record(0, "base", -1)];
        for (i, name) in names.iter().enumerate() {
            records.push(record(i as i64 + 1, name, 0));
        }
        Skeleton::from_records(&records).expect("valid skeleton")
    }

    fn frame(x: f64, z: f64) -> MotionFrame {
        let mut values = vec![0.0; FRAME_LEN];
        values[0] = 0.5;
        values[1] = x;
        values[3] = z;
        for offset in [4, 8, 12, 16, 21, 25, 30, 35, 39] {
            values[offset] = 1.0;
        }
        MotionFrame::from_values(0, &values).expect("valid frame")
    }

    fn clip() -> MotionClip {
        MotionClip {
            frames: vec![frame(0.0, 0.0), frame(1.0, 0.0), frame(2.0, 0.0)],
        }
    }

    fn options(camera: CameraMode) -> ConvertOptions {
        ConvertOptions {
            camera,
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_convert_emits_complete_document() {
        let text = convert_clip(
            &full_skeleton(),
            &clip(),
            &SideChannels::default(),
            &options(CameraMode::Null),
        )
        .expect("conversion succeeds");

        assert!(text.starts_with("HIERARCHY\nROOT base\n"));
        assert!(text.contains("MOTION\nFrames: 3\nFrame Time: 0.500000\n"));
        assert!(text.contains("JOINT camera"));
    }

    #[test]
    fn test_folded_mode_prunes_camera_joint() {
        let text = convert_clip(
            &full_skeleton(),
            &clip(),
            &SideChannels::default(),
            &options(CameraMode::XzYs),
        )
        .expect("conversion succeeds");
        assert!(!text.contains("JOINT camera"));
    }

    #[test]
    fn test_channel_mismatch_is_detected() {
        let skeleton =
            Skeleton::from_records(&[record(0, "base", -1), record(1, "chest", 0)])
                .expect("valid skeleton");
        let err = convert_clip(
            &skeleton,
            &clip(),
            &SideChannels::default(),
            &options(CameraMode::Null),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::ChannelMismatch { declared: 9, .. }
        ));
    }

    #[test]
    fn test_empty_clip_is_rejected() {
        let empty = MotionClip { frames: Vec::new() };
        let err = convert_clip(
            &full_skeleton(),
            &empty,
            &SideChannels::default(),
            &options(CameraMode::Null),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::EmptyMotion));
    }

    #[test]
    fn test_side_file_length_mismatch_is_fatal() {
        let sides = SideChannels {
            expected_velocity: Some(vec![[0.0; 3]; 2]),
            ..SideChannels::default()
        };
        let err = convert_clip(
            &full_skeleton(),
            &clip(),
            &sides,
            &options(CameraMode::Null),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::MalformedMotionRecord { .. }));
    }

    #[test]
    fn test_repetitions_from_duration_round_up() {
        // 3 frames at 0.5s each = 1.5s per loop.
        let mut opts = options(CameraMode::Null);
        opts.duration = 2.5;
        assert_eq!(repetitions(&clip(), &opts).unwrap(), 2);
        opts.duration = 0.0;
        opts.repeat = 4;
        assert_eq!(repetitions(&clip(), &opts).unwrap(), 4);
        opts.repeat = 0;
        assert_eq!(repetitions(&clip(), &opts).unwrap(), 1);
    }

    #[test]
    fn test_repeat_shifts_ground_plane_continuously() {
        let mut opts = options(CameraMode::Pos);
        opts.repeat = 2;
        let text = convert_clip(&full_skeleton(), &clip(), &SideChannels::default(), &opts)
            .expect("conversion succeeds");
        assert!(text.contains("Frames: 6\n"));

        // loop_offset x = 2*2 - 0 - 1 = 3; second pass starts at (0+3)*20.
        let lines: Vec<&str> = text.lines().collect();
        let motion_start = lines
            .iter()
            .position(|l| l.starts_with("Frame Time:"))
            .expect("motion header")
            + 1;
        let fourth: Vec<&str> = lines[motion_start + 3].split(' ').collect();
        assert_eq!(fourth[0], "60.000000");
    }

    #[test]
    fn test_heading_side_file_overrides_extraction() {
        let sides = SideChannels {
            heading: Some(vec![10.0, 20.0, 30.0]),
            ..SideChannels::default()
        };
        let series = heading_series(&clip(), &sides, &options(CameraMode::XzY));
        assert_eq!(series.unwrapped, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_heading_report_one_value_per_line() {
        let report = heading_report(&clip(), &options(CameraMode::XzYs)).expect("report");
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0.000000");
    }
}
