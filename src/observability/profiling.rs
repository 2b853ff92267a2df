//! Per-check timing and peak-memory spans.
//!
//! A [`PerfSpan`] brackets one unit of work. While it is open, a background
//! thread samples the process resident set size so the span can report the
//! peak it saw. Closing the span yields a [`PerfEntry`] for the report's
//! performance log.
//!
//! ```ignore
//! let span = PerfSpan::start("Duplicate Check");
//! let output = check.run(&tree, &ctx);
//! let entry = span.finish();
//! ```

use crate::errors::{HealthError, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessesToUpdate, System};

const SAMPLE_INTERVAL: Duration = Duration::from_millis(20);

/// One row of the performance log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfEntry {
    pub task: String,
    pub duration_sec: f64,
    pub memory_peak_mb: f64,
}

/// Resident memory of the current process, in bytes.
pub fn current_memory_bytes() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    sample_memory(&mut system, pid)
}

fn sample_memory(system: &mut System, pid: Pid) -> Option<u64> {
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).map(|p| p.memory())
}

/// Open timing span. Dropping it without [`PerfSpan::finish`] discards the
/// measurement but still stops the sampler.
pub struct PerfSpan {
    task: String,
    start: Instant,
    peak: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    sampler: Option<JoinHandle<()>>,
}

impl PerfSpan {
    #[must_use]
    pub fn start(task: impl Into<String>) -> Self {
        let peak = Arc::new(AtomicU64::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let sampler = spawn_sampler(Arc::clone(&peak), Arc::clone(&stop));

        Self {
            task: task.into(),
            start: Instant::now(),
            peak,
            stop,
            sampler,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Close the span and report its duration and peak memory.
    pub fn finish(mut self) -> PerfEntry {
        let elapsed = self.start.elapsed();
        self.stop_sampler();
        if let Some(bytes) = current_memory_bytes() {
            self.peak.fetch_max(bytes, Ordering::Relaxed);
        }

        let entry = PerfEntry {
            task: std::mem::take(&mut self.task),
            duration_sec: elapsed.as_secs_f64(),
            memory_peak_mb: self.peak.load(Ordering::Relaxed) as f64 / (1024.0 * 1024.0),
        };
        log::debug!(
            "{} took {:.3}s (peak {:.1} MB)",
            entry.task,
            entry.duration_sec,
            entry.memory_peak_mb
        );
        entry
    }

    fn stop_sampler(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.sampler.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        self.stop_sampler();
    }
}

fn spawn_sampler(peak: Arc<AtomicU64>, stop: Arc<AtomicBool>) -> Option<JoinHandle<()>> {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(e) => {
            log::debug!("Memory sampling unavailable: {}", e);
            return None;
        }
    };

    let spawned = std::thread::Builder::new()
        .name("dataset-health-perf".into())
        .spawn(move || {
            let mut system = System::new();
            loop {
                if let Some(bytes) = sample_memory(&mut system, pid) {
                    peak.fetch_max(bytes, Ordering::Relaxed);
                }
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                std::thread::sleep(SAMPLE_INTERVAL);
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::debug!("Could not start memory sampler: {}", e);
            None
        }
    }
}

/// Append a performance log to a plain-text file.
///
/// Nothing is written when there are no entries.
pub fn append_perf_log(path: &Path, scan_duration_sec: Option<f64>, entries: &[PerfEntry]) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let divider = "-".repeat(50);
    let duration = scan_duration_sec.map_or_else(|| "N/A".to_string(), |d| format!("{d:.3}s"));
    let mut lines = vec![
        format!("{:<26}: {}", "Scan Duration", duration),
        divider.clone(),
        "PERFORMANCE LOG".to_string(),
        divider,
    ];
    lines.extend(entries.iter().map(format_entry));
    lines.push(String::new());

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| HealthError::io_with_path("Failed to open performance log", path, e))?;
    file.write_all((lines.join("\n") + "\n").as_bytes())
        .map_err(|e| HealthError::io_with_path("Failed to write performance log", path, e))
}

/// `task : 1.2345 sec, 6.78 MB peak`
pub fn format_entry(entry: &PerfEntry) -> String {
    format!(
        "{:<30} : {:.4} sec, {:.2} MB peak",
        entry.task, entry.duration_sec, entry.memory_peak_mb
    )
}
