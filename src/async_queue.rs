//! Async counterpart of [`BoundedQueue`](crate::queue::BoundedQueue) for tokio tasks.
//!
//! Suspension uses two [`Notify`] handles. Each waiter enables its
//! `Notified` future *before* inspecting the state, so a wake-up issued
//! between the check and the `.await` is never lost.
//! Cancellation is a [`CancellationToken`]; binding the queue to an outer
//! token makes every suspended operation return [`QueueError::Cancelled`]
//! once that token fires. Buffered items are dropped on cancellation: right
//! away through [`AsyncBoundedQueue::cancel`], or by the next operation that
//! observes an outer token.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::{QueueError, TryPushError};
use crate::queue::CLOSED_APPEND;

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
    high_water_mark: usize,
}

#[derive(Debug)]
pub struct AsyncBoundedQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Notify,
    not_full: Notify,
    capacity: usize,
    cancel: CancellationToken,
}

impl<T> AsyncBoundedQueue<T> {
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        Self::build(capacity, CancellationToken::new())
    }

    /// Creates a queue that is cancelled whenever `token` is.
    ///
    /// Cancelling the queue itself does not propagate back to `token`.
    pub fn with_cancellation(
        capacity: usize,
        token: &CancellationToken,
    ) -> Result<Self, QueueError> {
        Self::build(capacity, token.child_token())
    }

    fn build(capacity: usize, cancel: CancellationToken) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        Ok(Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
                high_water_mark: 0,
            }),
            not_empty: Notify::new(),
            not_full: Notify::new(),
            capacity,
            cancel,
        })
    }

    /// Appends `item`, suspending while the queue is at capacity.
    ///
    /// # Panics
    ///
    /// Panics if the queue has been closed.
    pub async fn push(&self, item: T) -> Result<(), QueueError> {
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if self.discard_if_cancelled(&mut state) {
                    return Err(QueueError::Cancelled);
                }
                assert!(!state.closed, "{}", CLOSED_APPEND);
                if state.items.len() < self.capacity {
                    Self::enqueue(&mut state, item);
                    drop(state);
                    self.not_empty.notify_one();
                    return Ok(());
                }
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    pub fn try_push(&self, item: T) -> Result<(), TryPushError<T>> {
        let mut state = self.lock();
        if self.discard_if_cancelled(&mut state) {
            return Err(TryPushError::Cancelled(item));
        }
        if state.closed {
            return Err(TryPushError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(TryPushError::Full(item));
        }

        Self::enqueue(&mut state, item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, suspending while the queue is empty and open.
    ///
    /// Returns `Ok(None)` once the queue is both empty and closed.
    pub async fn pop(&self) -> Result<Option<T>, QueueError> {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if self.discard_if_cancelled(&mut state) {
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
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    pub fn try_pop(&self) -> Result<Option<T>, QueueError> {
        let mut state = self.lock();
        if self.discard_if_cancelled(&mut state) {
            return Err(QueueError::Cancelled);
        }
        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        Ok(item)
    }

    /// Marks the queue closed. Calling it again has no effect.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
    }

    /// Cancels the queue and drops every buffered item.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if !self.cancel.is_cancelled() {
            tracing::debug!(discarded = state.items.len(), "async bounded queue cancelled");
        }
        self.cancel.cancel();
        state.items.clear();
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
        self.cancel.is_cancelled()
    }

    pub fn high_water_mark(&self) -> usize {
        self.lock().high_water_mark
    }

    fn discard_if_cancelled(&self, state: &mut State<T>) -> bool {
        if !self.cancel.is_cancelled() {
            return false;
        }
        state.items.clear();
        true
    }

    fn enqueue(state: &mut State<T>, item: T) {
        state.items.push_back(item);
        state.high_water_mark = state.high_water_mark.max(state.items.len());
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
