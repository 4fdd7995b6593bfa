//! CLI command implementations

pub mod convert;
pub mod heading;

use anyhow::{bail, Result};
use bvhforge_core::HeadingAxis;

/// Maps the `--axis` argument to a heading axis.
pub(crate) fn parse_axis(name: &str) -> Result<HeadingAxis> {
    match name {
        "forward" => Ok(HeadingAxis::Forward),
        "lateral" => Ok(HeadingAxis::Lateral),
        other => bail!("unknown heading axis: {other} (expected forward or lateral)"),
    }
}
