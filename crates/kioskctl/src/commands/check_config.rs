//! Configuration validation command

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::KioskConfig;
use crate::output;

/// Load, validate and print a kiosk configuration file.
pub fn execute(path: &Path, json: bool) -> Result<()> {
    let config = KioskConfig::load(path)?;
    info!(path = %path.display(), "Configuration loaded");
    output::print_config(&config, json);
    Ok(())
}
