//! Crash reports, scan context and performance spans.
//!
//! - **Panic hook**: structured crash report for real crashes, a one-line
//!   warning for panics already isolated inside pool tasks
//! - **Context**: current scan phase and check progress
//! - **Profiling**: per-check duration and peak memory for the performance log

pub mod context;
pub mod panic_hook;
pub mod profiling;

pub use context::{
    current_phase, enter_pool_task, get_progress, in_pool_task, increment_checks_completed,
    set_checks_total, set_phase, PhaseGuard, PoolTaskGuard, ScanPhase,
};
pub use panic_hook::install_panic_hook;
pub use profiling::{append_perf_log, current_memory_bytes, format_entry, PerfEntry, PerfSpan};
