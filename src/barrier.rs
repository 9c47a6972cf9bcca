use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

// =============================================================================
// Join barrier: waits for a known number of tasks to finish
// =============================================================================

/// Counts outstanding tasks and blocks the coordinator until all are done.
#[derive(Debug)]
pub struct JoinBarrier {
    pending: Mutex<usize>,
    all_done: Condvar,
}

impl JoinBarrier {
    pub fn new(count: usize) -> Self {
        Self {
            pending: Mutex::new(count),
            all_done: Condvar::new(),
        }
    }

    /// Marks one task as finished.
    ///
    /// Panics if more tasks report completion than the barrier was created for.
    pub fn done(&self) {
        let mut pending = self.lock();
        assert!(*pending > 0, "join barrier released more times than its count");
        *pending -= 1;
        if *pending == 0 {
            self.all_done.notify_all();
        }
    }

    /// Returns a guard that calls [`done`](Self::done) when dropped, unwinding included.
    pub fn guard(&self) -> DoneGuard<'_> {
        DoneGuard { barrier: self }
    }

    /// Blocks until every task has called `done`.
    pub fn wait(&self) {
        let mut pending = self.lock();
        while *pending > 0 {
            pending = self
                .all_done
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn pending(&self) -> usize {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
#[must_use = "dropping the guard immediately marks the task as done"]
pub struct DoneGuard<'a> {
    barrier: &'a JoinBarrier,
}

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.barrier.done();
    }
}
