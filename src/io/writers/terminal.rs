use super::{summary_rows, DUPLICATE_GROUPS_SHOWN};
use crate::checks::{ClassDistribution, ClassStatus, CorruptFile, DuplicateReport, IssueCategory};
use crate::io::output::OutputWriter;
use crate::io::tree_view::render_tree;
use crate::observability::format_entry;
use crate::report::{HealthReport, HealthScore, HealthStatus, SuspiciousSamples, MAX_SCORE};
use crate::tree::DatasetTree;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════";
const DIVIDER: &str = "───────────────────────────────────────────";

pub struct TerminalWriter<W: Write> {
    writer: W,
    color: bool,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            color: true,
        }
    }

    /// Emit ANSI colors. Off when writing to a file.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn section(&mut self, icon: &str, title: &str) -> io::Result<()> {
        let title = self.paint(title, |s| s.bold());
        writeln!(self.writer, "{icon} {title}")?;
        writeln!(self.writer, "{DIVIDER}")
    }

    fn write_header(&mut self, report: &HealthReport) -> io::Result<()> {
        let rule = self.paint(RULE, |s| s.blue());
        let title = self.paint("           DATASET HEALTH CHECK", |s| s.bold().blue());
        writeln!(self.writer)?;
        writeln!(self.writer, "{rule}")?;
        writeln!(self.writer, "{title}")?;
        writeln!(self.writer, "{rule}")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "Dataset Path: {}", report.dataset_path.display())?;
        writeln!(
            self.writer,
            "Generated:    {}",
            report.last_updated.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(self.writer)
    }

    fn write_summary(&mut self, report: &HealthReport) -> io::Result<()> {
        self.section("📊", "SCAN SUMMARY")?;
        for (label, value) in summary_rows(&report.sections.summary) {
            writeln!(self.writer, "  {label:<20} {value}")?;
        }
        writeln!(self.writer)
    }

    fn write_class_distribution(&mut self, distribution: &ClassDistribution) -> io::Result<()> {
        self.section("📁", "CLASS DISTRIBUTION")?;
        if distribution.classes.is_empty() {
            writeln!(self.writer, "  No classes found")?;
            return writeln!(self.writer);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Class Name", "Path", "Files", "Percentage", "Status"]);
        for class in &distribution.classes {
            table.add_row(vec![
                class.name.clone(),
                class.path.clone(),
                class.count.to_string(),
                format!("{:.1}%", class.percentage),
                class.status.label().to_string(),
            ]);
        }
        for index in [2, 3] {
            if let Some(column) = table.column_mut(index) {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }
        writeln!(self.writer, "{table}")?;

        if let Some(ratio) = distribution.imbalance_ratio {
            let flagged = distribution.classes.len()
                - distribution.count_with_status(ClassStatus::Ok);
            let ratio = format!("{ratio:.2}");
            let ratio = if flagged > 0 {
                self.paint(&ratio, |s| s.yellow())
            } else {
                ratio
            };
            writeln!(self.writer)?;
            writeln!(self.writer, "  Imbalance Ratio (Max / Min): {ratio}")?;
        }
        writeln!(self.writer)
    }

    fn write_duplicates(&mut self, duplicates: &DuplicateReport) -> io::Result<()> {
        self.section("🔁", "DUPLICATE FILES")?;
        writeln!(self.writer, "  Duplicate Groups Found: {}", duplicates.groups_found)?;
        writeln!(self.writer, "  Total Duplicate Files:  {}", duplicates.total_duplicates)?;
        if !duplicates.unreadable.is_empty() {
            writeln!(self.writer, "  Unreadable Files:       {}", duplicates.unreadable.len())?;
        }

        for (i, group) in duplicates.examples.iter().take(DUPLICATE_GROUPS_SHOWN).enumerate() {
            writeln!(self.writer)?;
            writeln!(self.writer, "  Group {}:", i + 1)?;
            writeln!(self.writer, "    Hash: {}", group.hash)?;
            for (j, file) in group.files.iter().enumerate() {
                let shown = file.display().to_string();
                let shown = if j == 0 {
                    shown
                } else {
                    self.paint(&shown, |s| s.red())
                };
                writeln!(self.writer, "      - {shown}")?;
            }
        }
        if duplicates.examples.len() > DUPLICATE_GROUPS_SHOWN {
            writeln!(
                self.writer,
                "\n  ... and {} more groups",
                duplicates.examples.len() - DUPLICATE_GROUPS_SHOWN
            )?;
        }
        writeln!(self.writer)
    }

    fn write_corrupt_files(&mut self, corrupt: &[CorruptFile]) -> io::Result<()> {
        self.section("🧨", "CORRUPT FILES")?;
        writeln!(self.writer, "  Corrupt Files Found: {}", corrupt.len())?;
        for file in corrupt {
            let path = self.paint(&file.path.display().to_string(), |s| s.red());
            match &file.detail {
                Some(detail) => writeln!(self.writer, "    - {path} ({}: {detail})", file.reason)?,
                None => writeln!(self.writer, "    - {path} ({})", file.reason)?,
            }
        }
        writeln!(self.writer)
    }

    fn write_suspicious(&mut self, samples: &SuspiciousSamples) -> io::Result<()> {
        self.section("🔍", "SUSPICIOUS SAMPLES")?;
        for category in IssueCategory::ALL {
            let count = samples.count(category);
            let count = if count > 0 {
                self.paint(&count.to_string(), |s| s.yellow())
            } else {
                count.to_string()
            };
            writeln!(self.writer, "  {:<20} {}", category.label(), count)?;
        }
        if !samples.examples.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "  Example Issues:")?;
            for example in &samples.examples {
                writeln!(self.writer, "    - {example}")?;
            }
        }
        writeln!(self.writer)
    }

    fn write_recommendations(&mut self, recommendations: &[String]) -> io::Result<()> {
        if recommendations.is_empty() {
            return Ok(());
        }
        self.section("💡", "RECOMMENDATIONS")?;
        for (i, text) in recommendations.iter().enumerate() {
            writeln!(self.writer, "  {}. {}", i + 1, text)?;
        }
        writeln!(self.writer)
    }

    fn write_score(&mut self, score: &HealthScore) -> io::Result<()> {
        self.section("🩺", "OVERALL DATASET HEALTH SCORE")?;
        let style = |s: &str| match score.status {
            HealthStatus::Healthy => s.green().bold(),
            HealthStatus::NeedsAttention => s.yellow().bold(),
            HealthStatus::Critical => s.red().bold(),
        };
        let value = self.paint(&score.score.to_string(), style);
        let status = self.paint(score.status.label(), style);
        writeln!(self.writer, "  Score:  {value} / {MAX_SCORE}")?;
        writeln!(self.writer, "  Status: {status}")?;
        for (check, penalty) in score.penalties.iter().filter(|(_, p)| **p > 0) {
            writeln!(self.writer, "    -{penalty:<4} {}", check.display_name())?;
        }
        writeln!(self.writer)
    }

    fn write_performance(&mut self, report: &HealthReport) -> io::Result<()> {
        let entries = &report.sections.performance_log;
        if entries.is_empty() {
            return Ok(());
        }
        self.section("⏱", "PERFORMANCE LOG")?;
        for entry in entries {
            writeln!(self.writer, "  {}", format_entry(entry))?;
        }
        writeln!(self.writer)
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
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

        let rule = self.paint(RULE, |s| s.blue());
        writeln!(self.writer, "{rule}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_tree(&mut self, tree: &DatasetTree) -> anyhow::Result<()> {
        self.section("🌳", "DATASET TREE")?;
        write!(self.writer, "{}", render_tree(tree))?;
        writeln!(self.writer)?;
        Ok(())
    }
}
