pub mod json;
pub mod markdown;
pub mod terminal;

pub use json::JsonWriter;
pub use markdown::MarkdownWriter;
pub use terminal::TerminalWriter;

use crate::report::ScanSummary;

/// Duplicate groups listed in rendered reports.
pub const DUPLICATE_GROUPS_SHOWN: usize = 5;

/// Label/value pairs for the scan summary block.
fn summary_rows(summary: &ScanSummary) -> Vec<(&'static str, String)> {
    let checks = summary
        .checks_run
        .iter()
        .map(|c| c.display_name())
        .collect::<Vec<_>>()
        .join(", ");
    let duration = summary
        .scan_duration_sec
        .map_or_else(|| "N/A".to_string(), |d| format!("{d:.3}s"));

    vec![
        ("Total Files", summary.total_files.to_string()),
        ("Total Directories", summary.total_directories.to_string()),
        ("Checks Run", checks),
        ("Scan Duration", duration),
    ]
}
