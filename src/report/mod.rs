//! The health report produced by a pipeline run.
//!
//! Checks never write here directly. The pipeline owns the report and applies
//! each finished [`CheckOutcome`] to its section, one section per check, so
//! there is exactly one writer at any time.

pub mod lossy_path;
mod recommendations;
mod score;
mod suspicious;

pub use recommendations::{derive_recommendations, REBALANCE_RATIO};
pub use score::{
    compute_score, HealthScore, HealthStatus, HEALTHY_THRESHOLD, MAX_SCORE,
    NEEDS_ATTENTION_THRESHOLD,
};
pub use suspicious::SuspiciousSamples;

use crate::checks::{
    CheckKind, CheckOutcome, CheckOutput, ClassDistribution, CorruptFile, DuplicateReport,
    QualityIssue,
};
use crate::errors::Result;
use crate::observability::PerfEntry;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REPORT_NAME: &str = "Dataset Health Check Report";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_duration_sec: Option<f64>,
    pub total_files: usize,
    pub total_directories: usize,
    pub checks_run: Vec<CheckKind>,
}

/// Sections are `None` when the corresponding check did not run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSections {
    pub summary: ScanSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_distribution: Option<ClassDistribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<DuplicateReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrupt_files: Option<Vec<CorruptFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicious_samples: Option<SuspiciousSamples>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub performance_log: Vec<PerfEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub name: String,
    #[serde(serialize_with = "lossy_path::serialize")]
    pub dataset_path: PathBuf,
    pub created_at: DateTime<Local>,
    pub last_updated: DateTime<Local>,
    pub sections: ReportSections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<HealthScore>,
}

impl HealthReport {
    pub fn new(name: impl Into<String>, dataset_path: impl Into<PathBuf>) -> Self {
        let now = Local::now();
        Self {
            name: name.into(),
            dataset_path: dataset_path.into(),
            created_at: now,
            last_updated: now,
            sections: ReportSections::default(),
            health_score: None,
        }
    }

    fn touch(&mut self) {
        self.last_updated = Local::now();
    }

    pub fn set_summary(&mut self, summary: ScanSummary) {
        self.sections.summary = summary;
        self.touch();
    }

    pub fn set_class_distribution(&mut self, distribution: ClassDistribution) {
        self.sections.class_distribution = Some(distribution);
        self.touch();
    }

    pub fn set_duplicates(&mut self, duplicates: DuplicateReport) {
        self.sections.duplicates = Some(duplicates);
        self.touch();
    }

    pub fn set_corrupt_files(&mut self, corrupt: Vec<CorruptFile>) {
        self.sections.corrupt_files = Some(corrupt);
        self.touch();
    }

    pub fn set_suspicious_samples(&mut self, issues: Vec<QualityIssue>, max_examples: usize) {
        self.sections.suspicious_samples =
            Some(SuspiciousSamples::from_issues(issues, max_examples));
        self.touch();
    }

    pub fn add_recommendation(&mut self, text: impl Into<String>) {
        self.sections.recommendations.push(text.into());
        self.touch();
    }

    pub fn set_health_score(&mut self, penalties: BTreeMap<CheckKind, u32>) {
        self.health_score = Some(HealthScore::from_penalties(penalties));
        self.touch();
    }

    pub fn push_perf_entry(&mut self, entry: PerfEntry) {
        self.sections.performance_log.push(entry);
        self.touch();
    }

    /// Route a check's output into its section.
    pub fn apply_outcome(&mut self, outcome: CheckOutcome, max_examples: usize) {
        match outcome.output {
            CheckOutput::ClassDistribution(d) => self.set_class_distribution(d),
            CheckOutput::Duplicates(d) => self.set_duplicates(d),
            CheckOutput::CorruptFiles(c) => self.set_corrupt_files(c),
            CheckOutput::SuspiciousSamples(s) => self.set_suspicious_samples(s, max_examples),
        }
    }

    /// Record the scan duration and derive recommendations.
    pub fn finalize_scan(&mut self, duration: Duration) {
        self.sections.summary.scan_duration_sec = Some(duration.as_secs_f64());
        for recommendation in derive_recommendations(&self.sections) {
            self.add_recommendation(recommendation);
        }
        self.touch();
    }

    pub fn score(&self) -> Option<u32> {
        self.health_score.as_ref().map(|s| s.score)
    }

    /// Every file the report singles out, deduplicated, in section order.
    pub fn flagged_files(&self) -> Vec<&Path> {
        let mut seen = std::collections::HashSet::new();
        let corrupt = self
            .sections
            .corrupt_files
            .iter()
            .flatten()
            .map(|c| c.path.as_path());
        let duplicates = self
            .sections
            .duplicates
            .iter()
            .flat_map(|d| d.examples.iter())
            .flat_map(|g| g.extras().iter())
            .map(PathBuf::as_path);
        let suspicious = self
            .sections
            .suspicious_samples
            .iter()
            .flat_map(|s| s.details.iter())
            .map(|i| i.path.as_path());

        corrupt
            .chain(duplicates)
            .chain(suspicious)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
