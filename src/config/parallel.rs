//! Worker pool sizing for the checks' internal concurrency.
//!
//! Two pools are configured independently: a wide I/O pool for reads and text
//! parsing, and a narrow CPU pool for image decoding.

use serde::{Deserialize, Serialize};

/// Default number of I/O workers
fn default_io_workers() -> usize {
    8
}

/// Default number of CPU workers
fn default_cpu_workers() -> Option<usize> {
    Some(4)
}

/// Configuration for the I/O-bound and CPU-bound worker pools.
///
/// # Example
///
/// ```rust
/// use dataset_health::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     io_workers: 16,
///     cpu_workers: Some(2),
/// };
/// assert_eq!(config.effective_cpu_workers(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Threads used for file reads, hashing and text checks (default: 8)
    #[serde(default = "default_io_workers")]
    pub io_workers: usize,

    /// Threads used for image decoding (default: 4)
    ///
    /// If None, uses all available CPU cores.
    #[serde(default = "default_cpu_workers")]
    pub cpu_workers: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            io_workers: default_io_workers(),
            cpu_workers: default_cpu_workers(),
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single worker per pool. Useful for debugging.
    pub fn sequential() -> Self {
        Self {
            io_workers: 1,
            cpu_workers: Some(1),
        }
    }

    /// Get the effective I/O worker count (never zero).
    pub fn effective_io_workers(&self) -> usize {
        self.io_workers.max(1)
    }

    /// Get the effective CPU worker count.
    ///
    /// Returns the configured value, or the number of available CPU cores if
    /// not specified.
    pub fn effective_cpu_workers(&self) -> usize {
        self.cpu_workers.unwrap_or_else(num_cpus).max(1)
    }
}

/// Returns the number of available CPU cores.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}
