//! One producer thread and one consumer thread joined by a [`BoundedQueue`].
//!
//! The producer emits `0..count` and closes the queue; the consumer drains
//! it into a [`Sink`] until it is empty and closed. The coordinator waits on
//! a [`JoinBarrier`] sized for both tasks.

use std::thread;
use std::time::Duration;

use crate::barrier::JoinBarrier;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, QueueError};
use crate::guard::ScopeGuard;
use crate::queue::BoundedQueue;
use crate::sink::Sink;

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub produced: u64,
    pub consumed: u64,
    pub capacity: usize,
    pub high_water_mark: usize,
}

// =============================================================================
// Producer
// =============================================================================

/// Pushes `0..count` in order, then closes the queue.
///
/// The queue is closed on every exit path, so a consumer never waits on a
/// producer that has gone away.
pub fn produce(
    queue: &BoundedQueue<u64>,
    count: u64,
    interval: Duration,
) -> Result<u64, QueueError> {
    let _close = ScopeGuard::new(|| queue.close());

    for value in 0..count {
        queue.push(value)?;
        tracing::debug!(value, "produced");
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }

    queue.close();
    Ok(count)
}

// =============================================================================
// Consumer
// =============================================================================

/// Drains the queue into `sink` until it is empty and closed.
///
/// If the sink fails (or panics) the queue is cancelled so the producer is
/// released instead of blocking on a full queue forever.
pub fn consume<S>(
    queue: &BoundedQueue<u64>,
    sink: &mut S,
) -> Result<u64, PipelineError>
where
    S: Sink + ?Sized,
{
    let cancel = ScopeGuard::new(|| queue.cancel());
    let mut consumed = 0;

    while let Some(value) = queue.pop()? {
        sink.emit(value)?;
        consumed += 1;
    }

    cancel.disarm();
    Ok(consumed)
}

// =============================================================================
// Coordinator
// =============================================================================

/// Runs one producer and one consumer concurrently and returns once both are done.
pub fn run_pipeline<S>(
    config: &PipelineConfig,
    sink: &mut S,
) -> Result<PipelineReport, PipelineError>
where
    S: Sink + Send + ?Sized,
{
    config.validate()?;
    let queue = BoundedQueue::new(config.capacity)?;
    let barrier = JoinBarrier::new(2);

    tracing::info!(count = config.count, capacity = config.capacity, "starting pipeline");

    let (producer, consumer) = thread::scope(|s| {
        let producer = s.spawn(|| {
            let _done = barrier.guard();
            produce(&queue, config.count, config.produce_interval())
        });
        let consumer = s.spawn(|| {
            let _done = barrier.guard();
            consume(&queue, sink)
        });

        barrier.wait();
        (producer.join(), consumer.join())
    });

    let (produced, consumed) = match (producer, consumer) {
        (Err(_), _) => return Err(task_panicked("producer")),
        (_, Err(_)) => return Err(task_panicked("consumer")),
        (Ok(produced), Ok(consumed)) => (produced, consumed),
    };

    let report = PipelineReport {
        consumed: consumed?,
        produced: produced?,
        capacity: queue.capacity(),
        high_water_mark: queue.high_water_mark(),
    };

    tracing::info!(
        produced = report.produced,
        consumed = report.consumed,
        high_water_mark = report.high_water_mark,
        "pipeline finished"
    );
    Ok(report)
}

pub(crate) fn task_panicked(task: &'static str) -> PipelineError {
    tracing::warn!(task, "pipeline task panicked");
    PipelineError::TaskPanicked { task }
}
