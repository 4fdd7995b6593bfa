//! Convert command implementation
//!
//! Converts every selected motion of a working directory to a BVH file
//! under `{dir}/bvh/`.

use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use bvhforge_core::pipeline::convert_clip;
use bvhforge_core::{CameraMode, ConvertOptions};

use super::parse_axis;
use crate::input::{load_clip, load_sides, load_skeleton, DataDir, NameFilter};

/// Maps the `--camera` argument to a camera mode.
fn parse_camera(name: &str) -> Result<CameraMode> {
    Ok(match name {
        "null" => CameraMode::Null,
        "pos" => CameraMode::Pos,
        "pos_y" => CameraMode::PosY,
        "xz" => CameraMode::Xz,
        "xz_y" => CameraMode::XzY,
        "xz_ys" => CameraMode::XzYs,
        other => bail!("unknown camera mode: {other}"),
    })
}

/// Run the convert command
///
/// # Arguments
/// * `dir` - Working directory (character.json + motions/)
/// * `camera` - Camera mode name
/// * `smooth_factor` - Heading EMA factor
/// * `no_smoothing` - Disable heading smoothing
/// * `axis` - Heading reference axis name
/// * `repeat` - Repetition count for looped output
/// * `duration` - Minimum output duration in seconds (overrides repeat)
/// * `file` / `pattern` - Motion selection
#[allow(clippy::too_many_arguments)]
pub fn run(
    dir: &str,
    camera: &str,
    smooth_factor: f64,
    no_smoothing: bool,
    axis: &str,
    repeat: u32,
    duration: f64,
    file: Option<&str>,
    pattern: Option<&str>,
) -> Result<ExitCode> {
    let start = Instant::now();

    if !(0.0..=1.0).contains(&smooth_factor) || smooth_factor == 0.0 {
        bail!("smooth factor must be in (0, 1], got {smooth_factor}");
    }
    let options = ConvertOptions {
        camera: parse_camera(camera)?,
        smooth_factor,
        smoothing: !no_smoothing,
        heading_axis: parse_axis(axis)?,
        repeat,
        duration,
    };
    let dir = DataDir::new(dir);
    let filter = NameFilter::from_args(file, pattern)?;

    println!(
        "{} {}",
        "Converting:".cyan().bold(),
        dir.root().display()
    );
    println!("{} {}", "Camera mode:".cyan().bold(), camera);

    let skeleton = load_skeleton(&dir)?;
    let motions = dir.motion_files(&filter)?;
    if motions.is_empty() {
        println!("{}", "no motion files matched".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    fs::create_dir_all(dir.bvh_dir())
        .with_context(|| format!("failed to create output directory: {}", dir.bvh_dir().display()))?;

    for (name, path) in &motions {
        let clip = load_clip(path)?;
        let sides = load_sides(&dir, name)?;
        let bvh = convert_clip(&skeleton, &clip, &sides, &options)
            .with_context(|| format!("failed to convert motion: {}", path.display()))?;

        let out = dir.bvh_output_path(name);
        fs::write(&out, bvh)
            .with_context(|| format!("failed to write output file: {}", out.display()))?;
        println!(
            "  {} {} ({} frames)",
            "converted".green(),
            name,
            clip.len()
        );
    }

    println!(
        "{} {} motion(s) in {:.2}s",
        "Done:".green().bold(),
        motions.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(ExitCode::SUCCESS)
}
