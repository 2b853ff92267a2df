use crate::checks::{IssueCategory, QualityIssue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quality findings grouped for the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousSamples {
    /// Only categories with at least one finding appear.
    pub counts: BTreeMap<IssueCategory, usize>,
    /// First findings as `"path (issue)"`.
    pub examples: Vec<String>,
    pub details: Vec<QualityIssue>,
}

impl SuspiciousSamples {
    pub fn from_issues(issues: Vec<QualityIssue>, max_examples: usize) -> Self {
        let mut counts = BTreeMap::new();
        for issue in &issues {
            *counts.entry(issue.category).or_insert(0) += 1;
        }

        let examples = issues
            .iter()
            .take(max_examples)
            .map(|i| format!("{} ({})", i.path.display(), i.issue))
            .collect();

        Self {
            counts,
            examples,
            details: issues,
        }
    }

    pub fn total(&self) -> usize {
        self.details.len()
    }

    pub fn count(&self, category: IssueCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }
}
