//! Follow-up actions derived from a finished report.

use super::ReportSections;
use crate::checks::{ClassStatus, IssueCategory};

/// Imbalance ratio above which rebalancing is suggested.
pub const REBALANCE_RATIO: f64 = 10.0;

pub fn derive_recommendations(sections: &ReportSections) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(distribution) = &sections.class_distribution {
        let small: Vec<&str> = distribution
            .classes
            .iter()
            .filter(|c| matches!(c.status, ClassStatus::Critical | ClassStatus::LowCount))
            .map(|c| c.name.as_str())
            .collect();
        if !small.is_empty() {
            recommendations.push(format!(
                "Collect more samples for under-represented classes: {}",
                small.join(", ")
            ));
        }
        if let Some(ratio) = distribution.imbalance_ratio.filter(|r| *r >= REBALANCE_RATIO) {
            recommendations.push(format!(
                "Rebalance the dataset (largest class is {ratio:.1}x the smallest); consider resampling or augmentation"
            ));
        }
    }

    if let Some(duplicates) = sections.duplicates.as_ref().filter(|d| d.total_duplicates > 0) {
        recommendations.push(format!(
            "Remove {} duplicate files across {} groups (--clean quarantines all but the first copy)",
            duplicates.total_duplicates, duplicates.groups_found
        ));
    }

    if let Some(corrupt) = sections.corrupt_files.as_ref().filter(|c| !c.is_empty()) {
        recommendations.push(format!(
            "Repair or remove {} corrupt or empty files",
            corrupt.len()
        ));
    }

    if let Some(samples) = sections.suspicious_samples.as_ref().filter(|s| s.total() > 0) {
        let images = samples.count(IssueCategory::VeryDark)
            + samples.count(IssueCategory::VeryBright)
            + samples.count(IssueCategory::LowQuality);
        let texts =
            samples.count(IssueCategory::EmptyText) + samples.count(IssueCategory::GibberishText);
        if images > 0 {
            recommendations.push(format!(
                "Review {images} images with extreme brightness before training"
            ));
        }
        if texts > 0 {
            recommendations.push(format!("Review {texts} empty or gibberish text files"));
        }
        let other = samples.count(IssueCategory::OtherIssues);
        if other > 0 {
            recommendations.push(format!("Inspect {other} files that could not be analyzed"));
        }
    }

    recommendations
}
