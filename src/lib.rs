//! Bounded producer/consumer handoff.
//!
//! A fixed-capacity FIFO queue connects one producer to one consumer. The
//! producer emits `0..n` and closes the queue; the consumer drains it into a
//! [`Sink`] until it is empty and closed; a coordinator waits for both.
//! Two flavours are provided: OS threads ([`pipeline`]) and tokio tasks
//! ([`async_pipeline`]). [`race`] holds the first-of-two-events primitive
//! used for deadlines and cancellation.

pub mod async_pipeline;
pub mod async_queue;
pub mod barrier;
pub mod config;
pub mod error;
mod guard;
pub mod logging;
pub mod pipeline;
pub mod queue;
pub mod race;
pub mod sink;

pub use async_queue::AsyncBoundedQueue;
pub use barrier::{DoneGuard, JoinBarrier};
pub use config::{DeadlineConfig, PipelineConfig};
pub use error::{ConfigError, PipelineError, QueueError, RaceError, TryPushError};
pub use pipeline::{run_pipeline, PipelineReport};
pub use queue::BoundedQueue;
pub use race::{race, race_cancel, with_cancel, with_deadline, Raced};
pub use sink::{LogSink, Sink, VecSink, WriterSink};
