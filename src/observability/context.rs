//! Context tracking for crash reports.
//!
//! The scan phase is global: the pipeline runs one phase at a time and the
//! panic hook may fire on any thread. Whether the current thread is inside an
//! isolated pool task is thread-local, since pool workers run concurrently.

use crate::checks::CheckKind;
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

static CURRENT_PHASE: Mutex<Option<ScanPhase>> = Mutex::new(None);
static CHECKS_COMPLETED: AtomicUsize = AtomicUsize::new(0);
static CHECKS_TOTAL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static IN_POOL_TASK: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    TreeBuilding,
    Check(CheckKind),
    Reporting,
    Cleaning,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TreeBuilding => write!(f, "tree_building"),
            Self::Check(kind) => write!(f, "check:{}", kind.key()),
            Self::Reporting => write!(f, "reporting"),
            Self::Cleaning => write!(f, "cleaning"),
        }
    }
}

/// Restores the previous phase when dropped.
pub struct PhaseGuard {
    previous: Option<ScanPhase>,
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        store_phase(self.previous);
    }
}

fn store_phase(phase: Option<ScanPhase>) -> Option<ScanPhase> {
    match CURRENT_PHASE.lock() {
        Ok(mut current) => std::mem::replace(&mut *current, phase),
        Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), phase),
    }
}

#[must_use]
pub fn set_phase(phase: ScanPhase) -> PhaseGuard {
    PhaseGuard {
        previous: store_phase(Some(phase)),
    }
}

pub fn current_phase() -> Option<ScanPhase> {
    match CURRENT_PHASE.lock() {
        Ok(current) => *current,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Marks the current thread as running an isolated pool task.
pub struct PoolTaskGuard {
    previous: bool,
}

impl Drop for PoolTaskGuard {
    fn drop(&mut self) {
        IN_POOL_TASK.with(|flag| flag.set(self.previous));
    }
}

#[must_use]
pub fn enter_pool_task() -> PoolTaskGuard {
    PoolTaskGuard {
        previous: IN_POOL_TASK.with(|flag| flag.replace(true)),
    }
}

pub fn in_pool_task() -> bool {
    IN_POOL_TASK.with(Cell::get)
}

pub fn set_checks_total(total: usize) {
    CHECKS_TOTAL.store(total, Ordering::Relaxed);
    CHECKS_COMPLETED.store(0, Ordering::Relaxed);
}

pub fn increment_checks_completed() {
    CHECKS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

/// `(completed, total)` checks for the current run.
pub fn get_progress() -> (usize, usize) {
    (
        CHECKS_COMPLETED.load(Ordering::Relaxed),
        CHECKS_TOTAL.load(Ordering::Relaxed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_task_guard_nests() {
        assert!(!in_pool_task());
        {
            let _outer = enter_pool_task();
            assert!(in_pool_task());
            {
                let _inner = enter_pool_task();
                assert!(in_pool_task());
            }
            assert!(in_pool_task());
        }
        assert!(!in_pool_task());
    }

    #[test]
    fn test_pool_task_flag_is_per_thread() {
        let _guard = enter_pool_task();
        let other = std::thread::spawn(in_pool_task).join().unwrap();
        assert!(!other);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(ScanPhase::Check(CheckKind::Quality).to_string(), "check:quality");
        assert_eq!(ScanPhase::TreeBuilding.to_string(), "tree_building");
    }
}
