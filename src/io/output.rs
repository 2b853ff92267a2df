use crate::io::writers::{JsonWriter, MarkdownWriter, TerminalWriter};
use crate::report::HealthReport;
use crate::tree::DatasetTree;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl OutputFormat {
    /// Extension used when a report is saved next to the dataset.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Terminal => "txt",
        }
    }
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &HealthReport) -> anyhow::Result<()>;

    /// Render the directory layout. Formats without a tree view skip it.
    fn write_tree(&mut self, _tree: &DatasetTree) -> anyhow::Result<()> {
        Ok(())
    }
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    writer_for(format, Box::new(std::io::stdout()), true)
}

/// A writer targeting `path`. Terminal output written to a file is uncolored.
pub fn create_file_writer(format: OutputFormat, path: &Path) -> anyhow::Result<Box<dyn OutputWriter>> {
    let file = File::create(path)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", path.display(), e))?;
    Ok(writer_for(format, Box::new(BufWriter::new(file)), false))
}

fn writer_for(format: OutputFormat, sink: Box<dyn Write>, color: bool) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(sink).with_color(color)),
    }
}

/// Save `report` as `dataset_health_report.<ext>` inside the dataset folder.
pub fn save_report_in_dataset(
    report: &HealthReport,
    format: OutputFormat,
) -> anyhow::Result<std::path::PathBuf> {
    let path = report
        .dataset_path
        .join(format!("dataset_health_report.{}", format.extension()));
    let mut writer = create_file_writer(format, &path)?;
    writer.write_report(report)?;
    Ok(path)
}
