use super::{run_isolated, PoolKind, TaskOutcome, WorkerPool};
use crossbeam::channel;

/// Thread pool for I/O-bound work.
///
/// Workers are scoped threads pulling `(index, item)` jobs from a channel;
/// no threads outlive a batch.
#[derive(Debug, Clone)]
pub struct IoPool {
    workers: usize,
}

impl IoPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl WorkerPool for IoPool {
    fn kind(&self) -> PoolKind {
        PoolKind::Io
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
        if items.is_empty() {
            return Vec::new();
        }

        let total = items.len();
        let (job_tx, job_rx) = channel::unbounded::<(usize, T)>();
        let (done_tx, done_rx) = channel::unbounded::<TaskOutcome<T, R>>();

        for job in items.into_iter().enumerate() {
            // job_rx is alive until the end of this function
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let task = &task;
        std::thread::scope(|scope| {
            for _ in 0..self.workers.min(total) {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for (index, item) in job_rx.iter() {
                        let result = run_isolated(task, &item);
                        if done_tx.send(TaskOutcome { index, item, result }).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(done_tx);

        let outcomes: Vec<_> = done_rx.iter().collect();
        debug_assert_eq!(outcomes.len(), total);
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::sort_by_index;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_empty_batch() {
        let pool = IoPool::new(4);
        let outcomes = pool.run_batch(Vec::<u32>::new(), |x| *x);
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_every_item_has_one_outcome() {
        let pool = IoPool::new(4);
        let items: Vec<u32> = (0..100).collect();
        let outcomes = sort_by_index(pool.run_batch(items, |x| x * 10));
        assert_eq!(outcomes.len(), 100);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.index, i);
            assert_eq!(outcome.item, i as u32);
            assert_eq!(outcome.result, Ok(i as u32 * 10));
        }
    }

    #[test]
    fn test_panicking_item_does_not_abort_batch() {
        let pool = IoPool::new(2);
        let outcomes = sort_by_index(pool.run_batch(vec![1, 2, 3], |x| {
            if *x == 2 {
                panic!("cannot handle two");
            }
            *x
        }));
        assert_eq!(outcomes[0].result, Ok(1));
        assert!(outcomes[1].result.is_err());
        assert_eq!(outcomes[2].result, Ok(3));
    }

    #[test]
    fn test_bounded_concurrency() {
        let pool = IoPool::new(3);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        pool.run_batch((0..30).collect::<Vec<u32>>(), |_| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(2));
            active.fetch_sub(1, Ordering::SeqCst);
        });
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(IoPool::new(0).workers(), 1);
    }
}
