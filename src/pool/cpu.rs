use super::{run_isolated, PoolKind, TaskOutcome, WorkerPool};
use crate::errors::{HealthError, Result};
use rayon::prelude::*;

/// Dedicated rayon pool for CPU-bound work.
///
/// Kept separate from rayon's global pool so image decoding never competes
/// with anything else for threads.
pub struct CpuPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl CpuPool {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dataset-health-cpu-{i}"))
            .build()
            .map_err(|e| HealthError::config(format!("Failed to build CPU worker pool: {e}")))?;
        Ok(Self { pool, workers })
    }
}

impl std::fmt::Debug for CpuPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPool")
            .field("workers", &self.workers)
            .finish()
    }
}

impl WorkerPool for CpuPool {
    fn kind(&self) -> PoolKind {
        PoolKind::Cpu
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn run_batch<T, R, F>(&self, items: Vec<T>, task: F) -> Vec<TaskOutcome<T, R>>
    where
        T: Send,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        let task = &task;
        self.pool.install(|| {
            items
                .into_par_iter()
                .enumerate()
                .map(|(index, item)| {
                    let result = run_isolated(task, &item);
                    TaskOutcome { index, item, result }
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_on_dedicated_threads() {
        let pool = CpuPool::new(2).unwrap();
        let outcomes = pool.run_batch(vec![(); 8], |_| {
            std::thread::current().name().unwrap_or_default().to_string()
        });
        assert_eq!(outcomes.len(), 8);
        for outcome in outcomes {
            assert!(outcome.result.unwrap().starts_with("dataset-health-cpu-"));
        }
    }

    #[test]
    fn test_panic_is_isolated() {
        let pool = CpuPool::new(2).unwrap();
        let outcomes = pool.run_batch(vec!["ok", "boom", "ok"], |s| {
            if *s == "boom" {
                panic!("decoder exploded");
            }
            s.len()
        });
        let failures: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].item, "boom");
        assert_eq!(failures[0].result.as_ref().unwrap_err().message, "decoder exploded");
    }

    #[test]
    fn test_workers_reported() {
        assert_eq!(CpuPool::new(3).unwrap().workers(), 3);
        assert_eq!(CpuPool::new(0).unwrap().workers(), 1);
    }
}
