//! Devfile location helpers for a component directory

use anyhow::{Context, Result};
use std::path::Path;

/// Name under which a downloaded devfile is stored
pub const DEVFILE_NAME: &str = "devfile.yaml";

const DEVFILE_NAMES: &[&str] = &["devfile.yaml", ".devfile.yaml", "devfile.yml", ".devfile.yml"];

/// Directory holding odo's own state, ignored when checking for emptiness
const DOT_ODO_DIRECTORY: &str = ".odo";

/// Whether `dir` already holds a devfile under any of its accepted names
pub fn directory_contains_devfile(dir: &Path) -> Result<bool> {
    Ok(DEVFILE_NAMES.iter().any(|name| dir.join(name).is_file()))
}

/// Whether `dir` has no entries besides odo's own state directory
pub fn dir_is_empty(dir: &Path) -> Result<bool> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    for entry in entries {
        if entry?.file_name() != DOT_ODO_DIRECTORY {
            return Ok(false);
        }
    }
    Ok(true)
}
