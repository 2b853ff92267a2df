//! The analysis passes run by the pipeline.
//!
//! Each pass implements [`Check`]: it reads the tree, returns an owned result
//! value and derives its penalty from that value. Checks never see each
//! other's results. The set of checks is closed; [`CheckKind`] names them and
//! dispatches to the concrete implementations.

pub mod class_imbalance;
pub mod corrupt_files;
pub mod decode;
pub mod duplicates;
pub mod file_kind;
pub mod quality;

pub use class_imbalance::{ClassDistribution, ClassEntry, ClassImbalanceCheck, ClassStatus};
pub use corrupt_files::{CorruptFile, CorruptFileCheck, CorruptReason};
pub use duplicates::{DuplicateCheck, DuplicateGroup, DuplicateReport, UnreadableFile};
pub use quality::{ImageStats, IssueCategory, QualityCheck, QualityIssue};

use crate::config::HealthConfig;
use crate::errors::{HealthError, Result};
use crate::pool::Pools;
use crate::tree::DatasetTree;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Shared, read-only resources lent to a running check.
pub struct CheckContext<'a> {
    pub config: &'a HealthConfig,
    pub pools: &'a Pools,
}

/// One analysis pass over the dataset tree.
pub trait Check {
    type Output;

    fn kind(&self) -> CheckKind;

    /// Run to completion. Per-file problems are part of the output, never
    /// errors.
    fn run(&self, tree: &DatasetTree, ctx: &CheckContext<'_>) -> Self::Output;

    /// Points deducted from the health score for `output`.
    fn penalty(&self, _output: &Self::Output) -> u32 {
        0
    }
}

/// The closed set of available checks, in default pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ClassImbalance,
    Duplicate,
    CorruptFile,
    Quality,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::ClassImbalance,
        CheckKind::Duplicate,
        CheckKind::CorruptFile,
        CheckKind::Quality,
    ];

    /// Name used on the command line and in penalty maps.
    pub fn key(self) -> &'static str {
        match self {
            Self::ClassImbalance => "class_imbalance",
            Self::Duplicate => "duplicate",
            Self::CorruptFile => "corrupt_file",
            Self::Quality => "quality",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::ClassImbalance => "Class Imbalance Check",
            Self::Duplicate => "Duplicate Check",
            Self::CorruptFile => "Corrupt File Check",
            Self::Quality => "Quality Check",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(key.trim()))
    }

    pub fn available_keys() -> String {
        Self::ALL.map(CheckKind::key).join(", ")
    }

    /// Parse a selection such as `"(duplicate, quality)"`.
    ///
    /// Parentheses and whitespace are stripped and names are matched
    /// case-insensitively. Unknown names are skipped with a warning and
    /// repeats are dropped; an empty result is a configuration error.
    pub fn parse_selection(raw: &str) -> Result<Vec<CheckKind>> {
        let names = raw
            .trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace())
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty());
        Self::from_names(names).map_err(|_| {
            HealthError::config(format!(
                "No valid checks found in '{}'. Available: {}",
                raw,
                Self::available_keys()
            ))
        })
    }

    /// Resolve a list of names, keeping first-occurrence order.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Vec<CheckKind>> {
        let mut selected = Vec::new();
        for name in names {
            match Self::from_key(name) {
                Some(kind) if !selected.contains(&kind) => selected.push(kind),
                Some(_) => {}
                None => log::warn!("Ignoring unknown check '{}'", name),
            }
        }
        if selected.is_empty() {
            return Err(HealthError::config(format!(
                "No valid checks specified. Available: {}",
                Self::available_keys()
            )));
        }
        Ok(selected)
    }

    /// Instantiate this check from config, run it and compute its penalty.
    pub fn execute(self, tree: &DatasetTree, ctx: &CheckContext<'_>) -> CheckOutcome {
        let config = ctx.config;
        match self {
            Self::ClassImbalance => execute_check(
                ClassImbalanceCheck::from_config(config),
                tree,
                ctx,
                CheckOutput::ClassDistribution,
            ),
            Self::Duplicate => execute_check(
                DuplicateCheck::from_config(config),
                tree,
                ctx,
                CheckOutput::Duplicates,
            ),
            Self::CorruptFile => execute_check(
                CorruptFileCheck::from_config(config),
                tree,
                ctx,
                CheckOutput::CorruptFiles,
            ),
            Self::Quality => execute_check(
                QualityCheck::from_config(config),
                tree,
                ctx,
                CheckOutput::SuspiciousSamples,
            ),
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CheckKind {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s).ok_or_else(|| {
            HealthError::config(format!(
                "Unknown check '{}'. Available: {}",
                s,
                Self::available_keys()
            ))
        })
    }
}

/// A check's result, tagged by the report section it belongs to.
#[derive(Debug, Clone)]
pub enum CheckOutput {
    ClassDistribution(ClassDistribution),
    Duplicates(DuplicateReport),
    CorruptFiles(Vec<CorruptFile>),
    SuspiciousSamples(Vec<QualityIssue>),
}

/// Everything the pipeline keeps from one check run.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub output: CheckOutput,
    pub penalty: u32,
}

fn execute_check<C: Check>(
    check: C,
    tree: &DatasetTree,
    ctx: &CheckContext<'_>,
    wrap: fn(C::Output) -> CheckOutput,
) -> CheckOutcome {
    let output = check.run(tree, ctx);
    let penalty = check.penalty(&output);
    CheckOutcome {
        kind: check.kind(),
        output: wrap(output),
        penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection_with_parens() {
        let kinds = CheckKind::parse_selection("(duplicate, Quality)").unwrap();
        assert_eq!(kinds, vec![CheckKind::Duplicate, CheckKind::Quality]);
    }

    #[test]
    fn test_parse_selection_skips_unknown_and_repeats() {
        let kinds = CheckKind::parse_selection("quality,bogus,quality, corrupt_file").unwrap();
        assert_eq!(kinds, vec![CheckKind::Quality, CheckKind::CorruptFile]);
    }

    #[test]
    fn test_parse_selection_none_valid() {
        let err = CheckKind::parse_selection("(foo, bar)").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("class_imbalance, duplicate, corrupt_file, quality"));
    }

    #[test]
    fn test_parse_selection_empty() {
        assert!(CheckKind::parse_selection("()").is_err());
    }

    #[test]
    fn test_from_str_roundtrip() {
        for kind in CheckKind::ALL {
            assert_eq!(kind.key().parse::<CheckKind>().unwrap(), kind);
        }
        assert!("nope".parse::<CheckKind>().is_err());
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&CheckKind::CorruptFile).unwrap();
        assert_eq!(json, "\"corrupt_file\"");
    }
}
