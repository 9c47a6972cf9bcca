use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// =============================================================================
// Queue errors
// =============================================================================

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,

    #[error("queue was cancelled")]
    Cancelled,
}

/// Returned by `try_push`; the rejected item is handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TryPushError<T> {
    #[error("queue is full")]
    Full(T),

    #[error("queue is closed")]
    Closed(T),

    #[error("queue was cancelled")]
    Cancelled(T),
}

impl<T> TryPushError<T> {
    pub fn into_inner(self) -> T {
        match self {
            TryPushError::Full(item)
            | TryPushError::Closed(item)
            | TryPushError::Cancelled(item) => item,
        }
    }
}

// =============================================================================
// Configuration errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Pipeline errors
// =============================================================================

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Queue(QueueError),

    #[error("pipeline was cancelled before completion")]
    Cancelled,

    #[error("{task} task panicked")]
    TaskPanicked { task: &'static str },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<QueueError> for PipelineError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Queue(other),
        }
    }
}

// =============================================================================
// Race errors
// =============================================================================

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceError {
    #[error("deadline of {}ms elapsed before the work completed", .0.as_millis())]
    DeadlineElapsed(Duration),

    #[error("work was cancelled")]
    Cancelled,
}
