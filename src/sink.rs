//! Output side of the pipeline.
//!
//! The consumer hands every value it removes from the queue to a [`Sink`],
//! exactly once and in consumption order. Only the consumer task touches the
//! sink, so implementations need no internal synchronization.

use std::io::{self, Write};

pub trait Sink {
    fn emit(&mut self, value: u64) -> io::Result<()>;
}

impl<F> Sink for F
where
    F: FnMut(u64),
{
    fn emit(&mut self, value: u64) -> io::Result<()> {
        self(value);
        Ok(())
    }
}

/// Collects emitted values in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VecSink {
    values: Vec<u64>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<u64> {
        self.values
    }
}

impl Sink for VecSink {
    fn emit(&mut self, value: u64) -> io::Result<()> {
        self.values.push(value);
        Ok(())
    }
}

/// Emits one `tracing` event per value.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Sink for LogSink {
    fn emit(&mut self, value: u64) -> io::Result<()> {
        tracing::info!(value, "consumed");
        Ok(())
    }
}

/// Writes `Consumed: <value>` lines to any writer.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn emit(&mut self, value: u64) -> io::Result<()> {
        writeln!(self.writer, "Consumed: {}", value)
    }
}
