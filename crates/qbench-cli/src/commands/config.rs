//! Config command implementation.

use std::path::Path;

use anyhow::Result;

use super::common::load_config;

/// Print the effective configuration as YAML.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
