use serde::{Deserialize, Serialize};

pub fn default_low_count_class() -> u32 {
    5
}

pub fn default_duplicate_file() -> u32 {
    2
}

pub fn default_duplicate_cap() -> Option<u32> {
    Some(20)
}

pub fn default_corrupt_file() -> u32 {
    0
}

pub fn default_suspicious_sample() -> u32 {
    2
}

pub fn default_suspicious_cap() -> Option<u32> {
    Some(20)
}

/// Per-check penalty weights subtracted from the starting score of 100.
///
/// A `None` cap leaves the check uncapped; the final score is still floored
/// at zero by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PenaltyConfig {
    /// Points per class whose share is in the Low-Count band
    #[serde(default = "default_low_count_class")]
    pub low_count_class: u32,

    /// Points per extra duplicate file
    #[serde(default = "default_duplicate_file")]
    pub duplicate_file: u32,

    #[serde(default = "default_duplicate_cap")]
    pub duplicate_cap: Option<u32>,

    /// Points per corrupt file (informational by default)
    #[serde(default = "default_corrupt_file")]
    pub corrupt_file: u32,

    #[serde(default)]
    pub corrupt_cap: Option<u32>,

    /// Points per suspicious sample
    #[serde(default = "default_suspicious_sample")]
    pub suspicious_sample: u32,

    #[serde(default = "default_suspicious_cap")]
    pub suspicious_cap: Option<u32>,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            low_count_class: default_low_count_class(),
            duplicate_file: default_duplicate_file(),
            duplicate_cap: default_duplicate_cap(),
            corrupt_file: default_corrupt_file(),
            corrupt_cap: None,
            suspicious_sample: default_suspicious_sample(),
            suspicious_cap: default_suspicious_cap(),
        }
    }
}

/// `count * weight`, saturating, optionally capped.
pub fn weighted_penalty(count: usize, weight: u32, cap: Option<u32>) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    let raw = count.saturating_mul(weight);
    cap.map_or(raw, |cap| raw.min(cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let config = PenaltyConfig::default();
        assert_eq!(config.low_count_class, 5);
        assert_eq!(config.duplicate_file, 2);
        assert_eq!(config.duplicate_cap, Some(20));
        assert_eq!(config.corrupt_file, 0);
        assert_eq!(config.suspicious_cap, Some(20));
    }

    #[test]
    fn test_weighted_penalty_caps() {
        assert_eq!(weighted_penalty(3, 2, Some(20)), 6);
        assert_eq!(weighted_penalty(10, 2, Some(20)), 20);
        assert_eq!(weighted_penalty(11, 2, Some(20)), 20);
        assert_eq!(weighted_penalty(7, 5, None), 35);
    }

    #[test]
    fn test_weighted_penalty_saturates() {
        assert_eq!(weighted_penalty(usize::MAX, 5, None), u32::MAX);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: PenaltyConfig = toml::from_str("corrupt_file = 1").unwrap();
        assert_eq!(parsed.corrupt_file, 1);
        assert_eq!(parsed.duplicate_cap, Some(20));
        assert_eq!(parsed.corrupt_cap, None);
    }
}
