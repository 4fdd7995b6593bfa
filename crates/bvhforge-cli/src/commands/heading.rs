//! Heading command implementation
//!
//! Writes the unwrapped heading series of every selected motion to
//! `{dir}/y/{name}.txt`, the format the convert command reads back as a
//! precomputed heading override.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use bvhforge_core::pipeline::heading_report;
use bvhforge_core::ConvertOptions;

use super::parse_axis;
use crate::input::{load_clip, DataDir, NameFilter};

/// Run the heading command
pub fn run(dir: &str, axis: &str, file: Option<&str>, pattern: Option<&str>) -> Result<ExitCode> {
    let options = ConvertOptions {
        heading_axis: parse_axis(axis)?,
        ..ConvertOptions::default()
    };
    let dir = DataDir::new(dir);
    let filter = NameFilter::from_args(file, pattern)?;

    println!(
        "{} {}",
        "Extracting headings:".cyan().bold(),
        dir.root().display()
    );

    let motions = dir.motion_files(&filter)?;
    if motions.is_empty() {
        println!("{}", "no motion files matched".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    fs::create_dir_all(dir.heading_dir()).with_context(|| {
        format!(
            "failed to create output directory: {}",
            dir.heading_dir().display()
        )
    })?;

    for (name, path) in &motions {
        let clip = load_clip(path)?;
        let report = heading_report(&clip, &options)
            .with_context(|| format!("failed to extract heading: {}", path.display()))?;

        let out = dir.heading_path(name);
        fs::write(&out, report)
            .with_context(|| format!("failed to write output file: {}", out.display()))?;
        println!("  {} {}", "written".green(), out.display());
    }

    Ok(ExitCode::SUCCESS)
}
