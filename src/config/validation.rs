//! Configuration validation with error accumulation.
//!
//! All problems are collected before reporting so a user fixing a config file
//! sees every issue in one run.

use super::HealthConfig;
use crate::errors::{HealthError, Result};

/// Collect every validation problem in `config`, one message per field.
pub fn collect_config_errors(config: &HealthConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.parallel.io_workers == 0 {
        errors.push("parallel.io_workers: must be at least 1".to_string());
    }
    if config.parallel.cpu_workers == Some(0) {
        errors.push("parallel.cpu_workers: must be at least 1".to_string());
    }

    let quality = &config.quality;
    if !(0.0..=1.0).contains(&quality.printable_ratio) {
        errors.push(format!(
            "quality.printable_ratio: out of range (expected: 0.0-1.0, got: {})",
            quality.printable_ratio
        ));
    }
    if quality.dark_threshold >= quality.bright_threshold {
        errors.push(format!(
            "quality.dark_threshold: must be below bright_threshold ({} >= {})",
            quality.dark_threshold, quality.bright_threshold
        ));
    }
    if !(0.0..=255.0).contains(&quality.dark_threshold)
        || !(0.0..=255.0).contains(&quality.bright_threshold)
    {
        errors.push("quality: intensity thresholds must be within 0-255".to_string());
    }
    if quality.thumbnail_size == 0 {
        errors.push("quality.thumbnail_size: must be at least 1".to_string());
    }

    for pattern in &config.tree.ignore_patterns {
        if let Err(e) = glob::Pattern::new(pattern) {
            errors.push(format!("tree.ignore_patterns: invalid pattern '{pattern}': {e}"));
        }
    }

    errors
}

/// Validate `config`, folding every problem into one configuration error.
pub fn validate_config(config: &HealthConfig) -> Result<()> {
    let errors = collect_config_errors(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(HealthError::config(format!(
            "{} invalid setting(s): {}",
            errors.len(),
            errors.join("; ")
        )))
    }
}
