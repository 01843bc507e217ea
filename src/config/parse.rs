//! Manifest parsing and discovery

use crate::config::types::Manifest;
use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default manifest file names to search for
const MANIFEST_FILE_NAMES: &[&str] = &["cmdhost.yml", "cmdhost.yaml"];

/// Find the manifest by searching current and parent directories
pub fn find_manifest() -> ConfigResult<PathBuf> {
    find_manifest_from(env::current_dir().map_err(ConfigError::CurrentDir)?)
}

/// Find the manifest starting from a specific directory
pub fn find_manifest_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in MANIFEST_FILE_NAMES {
            let path = current_dir.join(file_name);
            searched_paths.push(path.display().to_string());

            if path.is_file() {
                debug!(path = %path.display(), "found manifest");
                return Ok(path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a manifest file from a path
pub fn parse_manifest_file(path: &Path) -> ConfigResult<Manifest> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_manifest(&contents)
}

/// Parse a manifest from a string
pub fn parse_manifest(yaml: &str) -> ConfigResult<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(yaml)?;
    debug!(commands = manifest.commands.len(), "parsed manifest");
    Ok(manifest)
}
