use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::HealthConfig;
use super::validation::validate_config;
use crate::errors::{HealthError, Result};

/// File name searched for in the current directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".dataset-health.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse and validate config from a TOML string.
pub fn parse_and_validate_config(contents: &str) -> Result<HealthConfig> {
    let config = toml::from_str::<HealthConfig>(contents)
        .map_err(|e| HealthError::config(format!("Failed to parse {CONFIG_FILE_NAME}: {e}")))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from an explicit path. Any failure is an error.
pub fn load_config_from_path(path: &Path) -> Result<HealthConfig> {
    let contents = read_config_file(path).map_err(|e| {
        HealthError::config_with_path(format!("Failed to read config file: {e}"), path)
    })?;
    parse_and_validate_config(&contents).map_err(|e| match e {
        HealthError::Configuration { message, .. } => HealthError::config_with_path(message, path),
        other => other,
    })
}

/// Try loading config from a discovered path. A missing file is not an error;
/// an unreadable or invalid one is reported and skipped.
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<HealthConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{} ({}). Using defaults.", e, config_path.display());
            None
        }
    }
}

pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Directory ancestors of `start` (inclusive), up to `max_depth` entries.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn discover_config(start: PathBuf) -> HealthConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            HealthConfig::default()
        })
}

/// Load config starting from the current directory.
pub fn load_config() -> HealthConfig {
    match std::env::current_dir() {
        Ok(dir) => discover_config(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            HealthConfig::default()
        }
    }
}
