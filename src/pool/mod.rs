//! Bounded worker pools used inside checks.
//!
//! Two pool types share one interface: submit a batch, get one
//! [`TaskOutcome`] per item back, never lose the batch to a single failing
//! item.
//!
//! - [`IoPool`]: many OS threads fed from a channel, for reads, hashing and
//!   text parsing. Outcomes come back in completion order.
//! - [`CpuPool`]: a dedicated rayon pool with few threads, for image
//!   decoding.
//!
//! Every task runs under `catch_unwind`, so a panicking decoder fails only
//! its own item. A pool call returns once the whole batch has drained.

mod cpu;
mod io;

pub use cpu::CpuPool;
pub use io::IoPool;

use crate::config::ParallelConfig;
use crate::errors::Result;
use crate::observability::enter_pool_task;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Io,
    Cpu,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::Cpu => write!(f, "cpu"),
        }
    }
}

/// A task that panicked instead of returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub message: String,
}

impl std::fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker task panicked: {}", self.message)
    }
}

/// Result of one submitted item. `index` is the item's position in the
/// submitted batch.
#[derive(Debug)]
pub struct TaskOutcome<T, R> {
    pub index: usize,
    pub item: T,
    pub result: std::result::Result<R, TaskFailure>,
}

/// Uniform batch interface over both pool types.
pub trait WorkerPool {
    fn kind(&self) -> PoolKind;

    fn workers(&self) -> usize;

    /// Run `task` over every item and wait for all of them.
    ///
    /// Returns exactly one outcome per item. Outcome order is unspecified;
    /// callers that need submission order use [`sort_by_index`].
    fn run_batch<T, R, F>(&self, items: Vec<T>, task: F) -> Vec<TaskOutcome<T, R>>
    where
        T: Send,
        R: Send,
        F: Fn(&T) -> R + Send + Sync;
}

/// Both pools, built once per pipeline run and lent to every check.
pub struct Pools {
    pub io: IoPool,
    pub cpu: CpuPool,
}

impl Pools {
    pub fn from_config(config: &ParallelConfig) -> Result<Self> {
        let io = IoPool::new(config.effective_io_workers());
        let cpu = CpuPool::new(config.effective_cpu_workers())?;
        log::debug!(
            "Worker pools ready: {} io workers, {} cpu workers",
            io.workers(),
            cpu.workers()
        );
        Ok(Self { io, cpu })
    }
}

/// Put outcomes back into submission order.
pub fn sort_by_index<T, R>(mut outcomes: Vec<TaskOutcome<T, R>>) -> Vec<TaskOutcome<T, R>> {
    outcomes.sort_by_key(|o| o.index);
    outcomes
}

pub(crate) fn run_isolated<T, R, F>(task: &F, item: &T) -> std::result::Result<R, TaskFailure>
where
    F: Fn(&T) -> R,
{
    let _task = enter_pool_task();
    catch_unwind(AssertUnwindSafe(|| task(item))).map_err(|payload| TaskFailure {
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
