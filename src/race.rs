//! First-of-two-events selection.
//!
//! [`race`] polls a unit of work against a competing signal (a deadline, a
//! cancellation) and reports whichever resolves first. The losing future is
//! dropped without being polled again. When both are ready on the same poll
//! the work wins.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::RaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Raced<T> {
    Completed(T),
    DeadlineElapsed,
    Cancelled,
}

impl<T> Raced<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Raced::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Raced::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Races `work` against `deadline`.
pub async fn race<W, D>(work: W, deadline: D) -> Raced<W::Output>
where
    W: Future,
    D: Future<Output = ()>,
{
    tokio::select! {
        biased;
        value = work => Raced::Completed(value),
        _ = deadline => Raced::DeadlineElapsed,
    }
}

/// Races `work` against a timer of length `duration`.
pub async fn with_deadline<F>(duration: Duration, work: F) -> Result<F::Output, RaceError>
where
    F: Future,
{
    match race(work, tokio::time::sleep(duration)).await {
        Raced::Completed(value) => Ok(value),
        _ => {
            tracing::debug!(deadline_ms = duration.as_millis() as u64, "deadline elapsed");
            Err(RaceError::DeadlineElapsed(duration))
        }
    }
}

/// Races `work` against `token` being cancelled.
pub async fn race_cancel<F>(work: F, token: &CancellationToken) -> Raced<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        value = work => Raced::Completed(value),
        _ = token.cancelled() => Raced::Cancelled,
    }
}

pub async fn with_cancel<F>(work: F, token: &CancellationToken) -> Result<F::Output, RaceError>
where
    F: Future,
{
    race_cancel(work, token)
        .await
        .completed()
        .ok_or(RaceError::Cancelled)
}
