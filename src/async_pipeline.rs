//! The producer/consumer pipeline on tokio tasks.
//!
//! Same contract as [`crate::pipeline`], with an optional
//! [`CancellationToken`] that stops both tasks early. The two task handles are
//! joined together, which is the async form of the join barrier.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::async_queue::AsyncBoundedQueue;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, QueueError};
use crate::guard::ScopeGuard;
use crate::pipeline::{task_panicked, PipelineReport};
use crate::sink::Sink;

pub async fn produce(
    queue: &AsyncBoundedQueue<u64>,
    count: u64,
    interval: Duration,
) -> Result<u64, QueueError> {
    let _close = ScopeGuard::new(|| queue.close());

    for value in 0..count {
        queue.push(value).await?;
        tracing::debug!(value, "produced");
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }

    queue.close();
    Ok(count)
}

pub async fn consume<S>(
    queue: &AsyncBoundedQueue<u64>,
    sink: &mut S,
) -> Result<u64, PipelineError>
where
    S: Sink + ?Sized,
{
    let cancel = ScopeGuard::new(|| queue.cancel());
    let mut consumed = 0;

    while let Some(value) = queue.pop().await? {
        sink.emit(value)?;
        consumed += 1;
    }

    cancel.disarm();
    Ok(consumed)
}

/// Runs the pipeline to completion and hands the sink back with the report.
pub async fn run_pipeline<S>(
    config: &PipelineConfig,
    sink: S,
) -> Result<(PipelineReport, S), PipelineError>
where
    S: Sink + Send + 'static,
{
    run_pipeline_with_cancel(config, sink, CancellationToken::new()).await
}

/// Like [`run_pipeline`], but returns [`PipelineError::Cancelled`] if `token`
/// fires before both tasks finish. Both tasks are awaited either way.
pub async fn run_pipeline_with_cancel<S>(
    config: &PipelineConfig,
    sink: S,
    token: CancellationToken,
) -> Result<(PipelineReport, S), PipelineError>
where
    S: Sink + Send + 'static,
{
    config.validate()?;
    let queue = Arc::new(AsyncBoundedQueue::with_cancellation(config.capacity, &token)?);

    tracing::info!(count = config.count, capacity = config.capacity, "starting async pipeline");

    let producer = {
        let queue = Arc::clone(&queue);
        let count = config.count;
        let interval = config.produce_interval();
        tokio::spawn(async move { produce(&queue, count, interval).await })
    };
    let consumer = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move {
            let mut sink = sink;
            let consumed = consume(&queue, &mut sink).await;
            (consumed, sink)
        })
    };

    let (producer, consumer) = tokio::join!(producer, consumer);

    let (produced, (consumed, sink)) = match (producer, consumer) {
        (Err(_), _) => return Err(task_panicked("producer")),
        (_, Err(_)) => return Err(task_panicked("consumer")),
        (Ok(produced), Ok(consumer)) => (produced, consumer),
    };

    let report = match (produced, consumed) {
        (Ok(produced), Ok(consumed)) => PipelineReport {
            produced,
            consumed,
            capacity: queue.capacity(),
            high_water_mark: queue.high_water_mark(),
        },
        (_, Err(err)) => return Err(log_failure(err)),
        (Err(err), _) => return Err(log_failure(err.into())),
    };

    tracing::info!(
        produced = report.produced,
        consumed = report.consumed,
        high_water_mark = report.high_water_mark,
        "async pipeline finished"
    );
    Ok((report, sink))
}

fn log_failure(err: PipelineError) -> PipelineError {
    match &err {
        PipelineError::Cancelled => tracing::warn!("async pipeline cancelled"),
        other => tracing::warn!(error = %other, "async pipeline failed"),
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::VecSink;

    #[tokio::test]
    async fn test_five_items_capacity_two() {
        let (report, sink) = run_pipeline(&PipelineConfig::new(5, 2), VecSink::new())
            .await
            .unwrap();
        assert_eq!(sink.values(), &[0, 1, 2, 3, 4]);
        assert_eq!(report.produced, 5);
        assert_eq!(report.consumed, 5);
        assert!(report.high_water_mark <= 2);
    }

    #[tokio::test]
    async fn test_zero_items() {
        let (report, sink) = run_pipeline(&PipelineConfig::new(0, 2), VecSink::new())
            .await
            .unwrap();
        assert!(sink.values().is_empty());
        assert_eq!(report.consumed, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_capacity_one_multi_thread() {
        let (report, sink) = run_pipeline(&PipelineConfig::new(3, 1), VecSink::new())
            .await
            .unwrap();
        assert_eq!(sink.into_values(), vec![0, 1, 2]);
        assert_eq!(report.high_water_mark, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_slow_producer() {
        let token = CancellationToken::new();
        let config =
            PipelineConfig::new(1_000, 2).with_produce_interval(Duration::from_millis(100));

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(350)).await;
                token.cancel();
            })
        };

        let result = run_pipeline_with_cancel(&config, VecSink::new(), token).await;
        assert!(matches!(result, Err(PipelineError::Cancelled)));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_panicking_sink_is_reported() {
        let sink = |value: u64| {
            if value == 1 {
                panic!("sink exploded");
            }
        };
        let result = run_pipeline(&PipelineConfig::new(20, 1), sink).await;
        assert!(matches!(result, Err(PipelineError::TaskPanicked { task: "consumer" })));
    }

    #[tokio::test]
    async fn test_consume_drains_closed_queue() {
        let queue = AsyncBoundedQueue::new(2).unwrap();
        queue.push(4).await.unwrap();
        queue.close();

        let mut sink = VecSink::new();
        assert_eq!(consume(&queue, &mut sink).await.unwrap(), 1);
        assert_eq!(sink.values(), &[4]);
    }
}
