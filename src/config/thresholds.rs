use serde::{Deserialize, Serialize};

fn default_dark_threshold() -> f64 {
    5.0
}

fn default_bright_threshold() -> f64 {
    250.0
}

fn default_printable_ratio() -> f64 {
    0.8
}

fn default_thumbnail_size() -> u32 {
    64
}

/// Thresholds for the quality check.
///
/// Images are downscaled to `thumbnail_size` × `thumbnail_size` grayscale
/// before their intensity statistics are computed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityThresholds {
    /// Mean intensity at or below which an image is very dark
    #[serde(default = "default_dark_threshold")]
    pub dark_threshold: f64,

    /// Mean intensity at or above which an image is very bright
    #[serde(default = "default_bright_threshold")]
    pub bright_threshold: f64,

    /// Minimum share of printable characters in a text file
    #[serde(default = "default_printable_ratio")]
    pub printable_ratio: f64,

    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            dark_threshold: default_dark_threshold(),
            bright_threshold: default_bright_threshold(),
            printable_ratio: default_printable_ratio(),
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

/// Share-of-total bands for class statuses, in percent. Bounds are exclusive.
pub const CRITICAL_SHARE: f64 = 1.0;
pub const LOW_COUNT_SHARE: f64 = 5.0;
pub const IMBALANCED_SHARE: f64 = 20.0;
