//! Blocking bounded FIFO queue for one producer thread and one consumer thread.
//!
//! `push` blocks while the queue is full, `pop` blocks while it is empty and
//! still open. Closing is a one-shot signal from the producer: everything pushed
//! before `close` is still delivered, after which `pop` reports `Ok(None)`.
//! Cancelling wakes every blocked caller with [`QueueError::Cancelled`].

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::{QueueError, TryPushError};

pub(crate) const CLOSED_APPEND: &str = "closed queue received an append";

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
    cancelled: bool,
    high_water_mark: usize,
}

#[derive(Debug)]
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        Ok(Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
                cancelled: false,
                high_water_mark: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        })
    }

    // =========================================================================
    // Producer side
    // =========================================================================

    /// Appends `item`, blocking while the queue is at capacity.
    ///
    /// # Panics
    ///
    /// Panics if the queue has been closed. Appending after closure is a bug in
    /// the producer, not a runtime condition.
    pub fn push(&self, item: T) -> Result<(), QueueError> {
        let mut state = self.lock();
        loop {
            if state.cancelled {
                return Err(QueueError::Cancelled);
            }
            assert!(!state.closed, "{}", CLOSED_APPEND);
            if state.items.len() < self.capacity {
                break;
            }
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        Self::enqueue(&mut state, item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Appends `item` only if a slot is free right now.
    pub fn try_push(&self, item: T) -> Result<(), TryPushError<T>> {
        let mut state = self.lock();
        if state.cancelled {
            return Err(TryPushError::Cancelled(item));
        }
        if state.closed {
            return Err(TryPushError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(TryPushError::Full(item));
        }

        Self::enqueue(&mut state, item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Marks the queue closed. Calling it again has no effect.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    // =========================================================================
    // Consumer side
    // =========================================================================

    /// Removes the oldest item, blocking while the queue is empty and open.
    ///
    /// Returns `Ok(None)` once the queue is both empty and closed.
    pub fn pop(&self) -> Result<Option<T>, QueueError> {
        let mut state = self.lock();
        loop {
            if state.cancelled {
                return Err(QueueError::Cancelled);
            }
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Ok(Some(item));
            }
            if state.closed {
                return Ok(None);
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Removes the oldest item if one is available right now.
    pub fn try_pop(&self) -> Result<Option<T>, QueueError> {
        let mut state = self.lock();
        if state.cancelled {
            return Err(QueueError::Cancelled);
        }
        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        Ok(item)
    }

    // =========================================================================
    // Shared
    // =========================================================================

    /// Wakes every blocked caller with `Cancelled`. Buffered items are discarded.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if state.cancelled {
            return;
        }
        state.cancelled = true;
        state.items.clear();
        drop(state);
        tracing::debug!("bounded queue cancelled");
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Largest number of items the queue has held at once.
    pub fn high_water_mark(&self) -> usize {
        self.lock().high_water_mark
    }

    fn enqueue(state: &mut State<T>, item: T) {
        state.items.push_back(item);
        state.high_water_mark = state.high_water_mark.max(state.items.len());
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
