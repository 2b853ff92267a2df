use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::parallel::ParallelConfig;
use super::scoring::PenaltyConfig;
use super::thresholds::QualityThresholds;

/// Root configuration structure, read from `.dataset-health.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HealthConfig {
    /// Checks to run when none are given on the command line
    #[serde(default)]
    pub checks: Option<Vec<String>>,

    #[serde(default)]
    pub parallel: ParallelConfig,

    #[serde(default)]
    pub penalties: PenaltyConfig,

    #[serde(default)]
    pub quality: QualityThresholds,

    #[serde(default)]
    pub tree: TreeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// How the dataset tree is built.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TreeConfig {
    /// Sort directory entries by name instead of keeping filesystem
    /// enumeration order. Makes class order and duplicate kept-copy
    /// selection reproducible across machines.
    #[serde(default)]
    pub sort_entries: bool,

    /// Glob patterns matched against entry names; matches are left out of
    /// the tree (e.g. `_quarantine`).
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_perf_log_path() -> PathBuf {
    PathBuf::from("logs.txt")
}

fn default_max_examples() -> usize {
    5
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// File the performance log is appended to when persisting is enabled
    #[serde(default = "default_perf_log_path")]
    pub perf_log_path: PathBuf,

    /// Number of suspicious-sample examples kept in the report
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            perf_log_path: default_perf_log_path(),
            max_examples: default_max_examples(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let parsed: HealthConfig = toml::from_str("").unwrap();
        assert_eq!(parsed, HealthConfig::default());
    }

    #[test]
    fn test_full_toml() {
        let contents = r#"
            checks = ["duplicate", "quality"]

            [parallel]
            io_workers = 4
            cpu_workers = 2

            [penalties]
            corrupt_file = 1
            corrupt_cap = 10

            [quality]
            printable_ratio = 0.9

            [tree]
            sort_entries = true
            ignore_patterns = ["_quarantine", ".*"]

            [output]
            max_examples = 3
        "#;
        let parsed: HealthConfig = toml::from_str(contents).unwrap();
        assert_eq!(
            parsed.checks,
            Some(vec!["duplicate".to_string(), "quality".to_string()])
        );
        assert_eq!(parsed.parallel.io_workers, 4);
        assert_eq!(parsed.penalties.corrupt_cap, Some(10));
        assert_eq!(parsed.quality.printable_ratio, 0.9);
        assert_eq!(parsed.quality.dark_threshold, 5.0);
        assert!(parsed.tree.sort_entries);
        assert_eq!(parsed.tree.ignore_patterns.len(), 2);
        assert_eq!(parsed.output.max_examples, 3);
        assert_eq!(parsed.output.perf_log_path, PathBuf::from("logs.txt"));
    }
}
