//! bvhforge - Command-line motion-capture to BVH converter
//!
//! This binary converts recorded character motion (skeleton plus per-frame
//! quaternion pose data, both JSON) into BVH animation files, and can emit
//! the intermediate heading series for inspection or reuse.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;

use bvhforge_cli::commands;

/// bvhforge - Motion-capture to BVH conversion
#[derive(Parser)]
#[command(name = "bvhforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert motions of a working directory to BVH files
    Convert {
        /// Working directory (character.json + motions/)
        #[arg(short, long, default_value = ".")]
        dir: String,

        /// Camera mode
        #[arg(long, default_value = "xz_ys", value_parser = ["null", "pos", "pos_y", "xz", "xz_y", "xz_ys"])]
        camera: String,

        /// Heading smoothing factor in (0, 1]
        #[arg(long, default_value_t = 0.05)]
        smooth_factor: f64,

        /// Disable heading smoothing
        #[arg(long)]
        no_smoothing: bool,

        /// Heading reference axis
        #[arg(long, default_value = "forward", value_parser = ["forward", "lateral"])]
        axis: String,

        /// Emit the clip this many times, tiling root motion continuously
        #[arg(long, default_value_t = 1)]
        repeat: u32,

        /// Minimum output duration in seconds (overrides --repeat)
        #[arg(long, default_value_t = 0.0)]
        duration: f64,

        /// Convert a single motion by name
        #[arg(long)]
        file: Option<String>,

        /// Convert motions whose name matches a regular expression
        #[arg(long)]
        regex: Option<String>,
    },

    /// Write the unwrapped heading series of each motion to {dir}/y/
    Heading {
        /// Working directory (character.json + motions/)
        #[arg(short, long, default_value = ".")]
        dir: String,

        /// Heading reference axis
        #[arg(long, default_value = "forward", value_parser = ["forward", "lateral"])]
        axis: String,

        /// Process a single motion by name
        #[arg(long)]
        file: Option<String>,

        /// Process motions whose name matches a regular expression
        #[arg(long)]
        regex: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            dir,
            camera,
            smooth_factor,
            no_smoothing,
            axis,
            repeat,
            duration,
            file,
            regex,
        } => commands::convert::run(
            &dir,
            &camera,
            smooth_factor,
            no_smoothing,
            &axis,
            repeat,
            duration,
            file.as_deref(),
            regex.as_deref(),
        ),
        Commands::Heading {
            dir,
            axis,
            file,
            regex,
        } => commands::heading::run(&dir, &axis, file.as_deref(), regex.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
