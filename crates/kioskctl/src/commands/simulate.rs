//! Virtual-time scenario command

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::output;
use crate::script::{self, Script};

/// Replay a scenario file and print its timeline.
pub fn execute(path: &Path, json: bool) -> Result<()> {
    let script = Script::load(path)?;
    info!(
        path = %path.display(),
        steps = script.steps.len(),
        "Simulating scenario"
    );
    let report = script::simulate(&script)?;
    output::print_simulation(&report, json);
    Ok(())
}
