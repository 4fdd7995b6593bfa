//! BVH text serialization.
//!
//! The hierarchy block is a depth-first walk of the skeleton; the channel
//! declarations it emits define, joint by joint, the meaning of every value
//! in a motion line. [`channel_count`] exposes the declared total so callers
//! can check assembled frames against it before rendering.

use crate::assemble::UNIT_SCALE;
use crate::character::Skeleton;

const POSITION_CHANNELS: &str = "Xposition Yposition Zposition";
const ROTATION_CHANNELS: &str = "Zrotation Yrotation Xrotation";

/// Channels declared for one joint: 6 (position + rotation) for the
/// hierarchy root and for any joint literally named "root" (the character
/// pelvis, carried over from the recording format), 3 (rotation) otherwise.
fn joint_channels(skeleton: &Skeleton, index: usize) -> usize {
    if index == 0 || skeleton.joint(index).name.eq_ignore_ascii_case("root") {
        6
    } else {
        3
    }
}

/// Total number of channels the hierarchy block declares.
pub fn channel_count(skeleton: &Skeleton) -> usize {
    (0..skeleton.len())
        .map(|index| joint_channels(skeleton, index))
        .sum()
}

fn format_triple(v: [f64; 3]) -> String {
    format!("{:.6} {:.6} {:.6}", v[0], v[1], v[2])
}

fn write_joint(skeleton: &Skeleton, index: usize, depth: usize, out: &mut String) {
    let joint = skeleton.joint(index);
    let indent = "\t".repeat(depth);
    let keyword = if index == 0 { "ROOT" } else { "JOINT" };

    out.push_str(&format!("{indent}{keyword} {}\n", joint.name));
    out.push_str(&format!("{indent}{{\n"));

    let offset = joint.attach * UNIT_SCALE;
    out.push_str(&format!(
        "{indent}\tOFFSET {}\n",
        format_triple([offset.x, offset.y, offset.z])
    ));
    if joint_channels(skeleton, index) == 6 {
        out.push_str(&format!(
            "{indent}\tCHANNELS 6 {POSITION_CHANNELS} {ROTATION_CHANNELS}\n"
        ));
    } else {
        out.push_str(&format!("{indent}\tCHANNELS 3 {ROTATION_CHANNELS}\n"));
    }

    if joint.children.is_empty() {
        out.push_str(&format!("{indent}\tEnd Site\n"));
        out.push_str(&format!("{indent}\t{{\n"));
        out.push_str(&format!("{indent}\t\tOFFSET 0.000000 0.000000 0.000000\n"));
        out.push_str(&format!("{indent}\t}}\n"));
    } else {
        for &child in &joint.children {
            write_joint(skeleton, child, depth + 1, out);
        }
    }

    out.push_str(&format!("{indent}}}\n"));
}

/// Renders a complete BVH document from the skeleton and assembled frames.
///
/// `frames` must already be in hierarchy channel order and of length
/// [`channel_count`] each; the pipeline validates this before calling.
pub fn render_bvh(skeleton: &Skeleton, frames: &[Vec<f64>], frame_time: f64) -> String {
    let mut out = String::new();

    out.push_str("HIERARCHY\n");
    write_joint(skeleton, 0, 0, &mut out);

    out.push_str("MOTION\n");
    out.push_str(&format!("Frames: {}\n", frames.len()));
    out.push_str(&format!("Frame Time: {frame_time:.6}\n"));
    for frame in frames {
        let line: Vec<String> = frame.iter().map(|v| format!("{v:.6}")).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::JointRecord;
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

    fn skeleton(names_and_parents: &[(&str, i64)]) -> Skeleton {
        let records: Vec<JointRecord> = names_and_parents
            .iter()
            .enumerate()
            .map(|(id, (name, parent))| record(id as i64, name, *parent))
            .collect();
        Skeleton::from_records(&records).expect("valid skeleton")
    }

    #[test]
    fn test_channel_count_without_root_named_joint() {
        let s = skeleton(&[("base", -1), ("chest", 0), ("neck", 1)]);
        // 6 + 3 * (len - 1) when no joint is literally named "root".
        assert_eq!(channel_count(&s), 6 + 3 * 2);
    }

    #[test]
    fn test_root_named_pelvis_declares_six_channels() {
        let s = skeleton(&[("base", -1), ("root", 0), ("chest", 1)]);
        assert_eq!(channel_count(&s), 6 + 6 + 3);
        let text = render_bvh(&s, &[], 1.0 / 30.0);
        assert_eq!(text.matches("CHANNELS 6").count(), 2);
        assert_eq!(text.matches("CHANNELS 3").count(), 1);
    }

    #[test]
    fn test_two_joint_skeleton_has_one_end_site() {
        let s = skeleton(&[("base", -1), ("chest", 0)]);
        let text = render_bvh(&s, &[], 1.0 / 30.0);
        assert_eq!(text.matches("End Site").count(), 1);
        assert!(text.contains("OFFSET 0.000000 0.000000 0.000000"));
    }

    #[test]
    fn test_offsets_are_scaled() {
        let s = skeleton(&[("base", -1), ("chest", 0)]);
        let text = render_bvh(&s, &[], 1.0 / 30.0);
        // attach_y 0.1 scaled by 20.
        assert!(text.contains("OFFSET 0.000000 2.000000 0.000000"));
    }

    #[test]
    fn test_motion_block_header_and_lines() {
        let s = skeleton(&[("base", -1)]);
        let frames = vec![vec![0.0; 6], vec![1.0, 0.0, -2.5, 0.0, 90.0, 0.0]];
        let text = render_bvh(&s, &frames, 1.0 / 30.0);

        assert!(text.contains("MOTION\nFrames: 2\nFrame Time: 0.033333\n"));
        assert!(text.contains("1.000000 0.000000 -2.500000 0.000000 90.000000 0.000000"));
    }

    #[test]
    fn test_hierarchy_structure_nests_depth_first() {
        let s = skeleton(&[("base", -1), ("root", 0), ("chest", 1), ("right_hip", 1)]);
        let text = render_bvh(&s, &[], 1.0 / 30.0);

        let base = text.find("ROOT base").expect("base joint");
        let root = text.find("JOINT root").expect("root joint");
        let chest = text.find("JOINT chest").expect("chest joint");
        let hip = text.find("JOINT right_hip").expect("hip joint");
        assert!(base < root && root < chest && chest < hip);
    }
}
