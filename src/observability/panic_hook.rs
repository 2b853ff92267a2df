//! Panic hook for structured crash reports.
//!
//! Panics inside pool tasks are caught and recorded as per-file findings, so
//! the hook only logs a one-line warning for them. Any other panic is a real
//! crash and gets a full report on stderr.

use super::context::{current_phase, get_progress, in_pool_task, ScanPhase};
use std::panic::PanicHookInfo;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WIDTH: usize = 78;

/// Install the crash-report hook. Call early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        if in_pool_task() {
            log::warn!(
                "Worker task panicked at {}: {}",
                location(info).unwrap_or_else(|| "unknown location".into()),
                extract_panic_message(info)
            );
        } else {
            print_crash_report(info);
        }
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let (completed, total) = get_progress();
    let border = "═".repeat(WIDTH);

    eprintln!();
    eprintln!("╔{}╗", border);
    boxed_line(&format!("{:^width$}", "DATASET-HEALTH CRASH REPORT", width = WIDTH - 2));
    eprintln!("╠{}╣", border);
    boxed_line(&format!("Version: {}", VERSION));
    boxed_line(&format!("Platform: {}", std::env::consts::OS));
    boxed_line(&format!(
        "Time: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    eprintln!("╠{}╣", border);
    boxed_line(&format!("PANIC: {}", extract_panic_message(info)));
    if let Some(loc) = location(info) {
        boxed_line(&format!("Location: {}", loc));
    }
    boxed_line(&format!("Phase: {}", describe_phase(current_phase())));
    if total > 0 {
        boxed_line(&format!("Checks completed: {} / {}", completed, total));
    }
    eprintln!("╠{}╣", border);
    if std::env::var("RUST_BACKTRACE").is_ok() {
        boxed_line("STACK TRACE:");
        eprintln!("╚{}╝", border);
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        boxed_line("Run with RUST_BACKTRACE=1 for stack trace");
        eprintln!("╚{}╝", border);
    }
}

fn boxed_line(text: &str) {
    eprintln!("║  {:<width$}║", truncate(text, WIDTH - 2), width = WIDTH - 2);
}

fn describe_phase(phase: Option<ScanPhase>) -> String {
    phase.map_or_else(
        || "(not set - crash occurred before the scan started)".to_string(),
        |p| p.to_string(),
    )
}

fn location(info: &PanicHookInfo<'_>) -> Option<String> {
    info.location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
