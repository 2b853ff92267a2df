//! Configuration for dataset health scans.
//!
//! Settings come from `.dataset-health.toml` (searched upward from the
//! current directory) or an explicit `--config` file; command-line flags are
//! applied on top by the binary.

mod core;
mod loader;
mod parallel;
mod scoring;
mod thresholds;
pub mod validation;

pub use self::core::{HealthConfig, OutputConfig, TreeConfig};
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from_path,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
pub use parallel::ParallelConfig;
pub use scoring::{weighted_penalty, PenaltyConfig};
pub use thresholds::{QualityThresholds, CRITICAL_SHARE, IMBALANCED_SHARE, LOW_COUNT_SHARE};
pub use validation::validate_config;
