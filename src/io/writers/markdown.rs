use super::{summary_rows, DUPLICATE_GROUPS_SHOWN};
use crate::checks::{ClassDistribution, CorruptFile, DuplicateReport, IssueCategory};
use crate::io::output::OutputWriter;
use crate::io::tree_view::render_tree;
use crate::report::{HealthReport, HealthScore, SuspiciousSamples, MAX_SCORE};
use crate::tree::DatasetTree;
use std::io::Write;

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_header(&mut self, report: &HealthReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# {}", report.name)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "- **Dataset:** `{}`", report.dataset_path.display())?;
        writeln!(
            self.writer,
            "- **Generated:** {}",
            report.last_updated.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(self.writer, "- **Version:** {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, report: &HealthReport) -> anyhow::Result<()> {
        writeln!(self.writer, "## Scan Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        for (label, value) in summary_rows(&report.sections.summary) {
            writeln!(self.writer, "| {label} | {value} |")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_class_distribution(&mut self, distribution: &ClassDistribution) -> anyhow::Result<()> {
        writeln!(self.writer, "## Class Distribution")?;
        writeln!(self.writer)?;
        if distribution.classes.is_empty() {
            writeln!(self.writer, "_No classes found._")?;
            writeln!(self.writer)?;
            return Ok(());
        }

        writeln!(self.writer, "| Class | Path | Files | Percentage | Status |")?;
        writeln!(self.writer, "|-------|------|------:|-----------:|--------|")?;
        for class in &distribution.classes {
            writeln!(
                self.writer,
                "| {} | {} | {} | {:.1}% | {} |",
                escape_cell(&class.name),
                escape_cell(&class.path),
                class.count,
                class.percentage,
                class.status.label()
            )?;
        }
        if let Some(ratio) = distribution.imbalance_ratio {
            writeln!(self.writer)?;
            writeln!(self.writer, "**Imbalance Ratio (Max / Min):** {ratio:.2}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_duplicates(&mut self, duplicates: &DuplicateReport) -> anyhow::Result<()> {
        writeln!(self.writer, "## Duplicate Files")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "- Duplicate groups found: {}", duplicates.groups_found)?;
        writeln!(self.writer, "- Total duplicate files: {}", duplicates.total_duplicates)?;
        if !duplicates.unreadable.is_empty() {
            writeln!(self.writer, "- Unreadable files: {}", duplicates.unreadable.len())?;
        }

        for (i, group) in duplicates.examples.iter().take(DUPLICATE_GROUPS_SHOWN).enumerate() {
            writeln!(self.writer)?;
            writeln!(self.writer, "### Group {}", i + 1)?;
            writeln!(self.writer)?;
            writeln!(self.writer, "Hash: `{}`", group.hash)?;
            writeln!(self.writer)?;
            for file in &group.files {
                writeln!(self.writer, "- `{}`", file.display())?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_corrupt_files(&mut self, corrupt: &[CorruptFile]) -> anyhow::Result<()> {
        writeln!(self.writer, "## Corrupt Files")?;
        writeln!(self.writer)?;
        if corrupt.is_empty() {
            writeln!(self.writer, "_No corrupt files found._")?;
            writeln!(self.writer)?;
            return Ok(());
        }

        writeln!(self.writer, "| File | Reason |")?;
        writeln!(self.writer, "|------|--------|")?;
        for file in corrupt {
            writeln!(
                self.writer,
                "| `{}` | {} |",
                file.path.display(),
                escape_cell(&file.reason.to_string())
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_suspicious(&mut self, samples: &SuspiciousSamples) -> anyhow::Result<()> {
        writeln!(self.writer, "## Suspicious Samples")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Category | Count |")?;
        writeln!(self.writer, "|----------|------:|")?;
        for category in IssueCategory::ALL {
            writeln!(self.writer, "| {} | {} |", category.label(), samples.count(category))?;
        }
        if !samples.examples.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "**Example issues:**")?;
            writeln!(self.writer)?;
            for example in &samples.examples {
                writeln!(self.writer, "- {example}")?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_recommendations(&mut self, recommendations: &[String]) -> anyhow::Result<()> {
        if recommendations.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Recommendations")?;
        writeln!(self.writer)?;
        for (i, text) in recommendations.iter().enumerate() {
            writeln!(self.writer, "{}. {}", i + 1, text)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_score(&mut self, score: &HealthScore) -> anyhow::Result<()> {
        writeln!(self.writer, "## Overall Dataset Health Score")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "**Score:** {} / {}", score.score, MAX_SCORE)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "**Status:** {}", score.status.label())?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Check | Penalty |")?;
        writeln!(self.writer, "|-------|--------:|")?;
        for (check, penalty) in &score.penalties {
            writeln!(self.writer, "| {} | {} |", check.display_name(), penalty)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_performance(&mut self, report: &HealthReport) -> anyhow::Result<()> {
        let entries = &report.sections.performance_log;
        if entries.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Performance Log")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Task | Duration (s) | Peak Memory (MB) |")?;
        writeln!(self.writer, "|------|-------------:|-----------------:|")?;
        for entry in entries {
            writeln!(
                self.writer,
                "| {} | {:.4} | {:.2} |",
                entry.task, entry.duration_sec, entry.memory_peak_mb
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &HealthReport) -> anyhow::Result<()> {
        let sections = &report.sections;
        self.write_header(report)?;
        self.write_summary(report)?;
        if let Some(distribution) = &sections.class_distribution {
            self.write_class_distribution(distribution)?;
        }
        if let Some(duplicates) = &sections.duplicates {
            self.write_duplicates(duplicates)?;
        }
        if let Some(corrupt) = &sections.corrupt_files {
            self.write_corrupt_files(corrupt)?;
        }
        if let Some(samples) = &sections.suspicious_samples {
            self.write_suspicious(samples)?;
        }
        self.write_recommendations(&sections.recommendations)?;
        if let Some(score) = &report.health_score {
            self.write_score(score)?;
        }
        self.write_performance(report)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_tree(&mut self, tree: &DatasetTree) -> anyhow::Result<()> {
        writeln!(self.writer, "## Dataset Tree")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "```text")?;
        write!(self.writer, "{}", render_tree(tree))?;
        writeln!(self.writer, "```")?;
        writeln!(self.writer)?;
        Ok(())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
