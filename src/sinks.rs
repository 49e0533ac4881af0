//! Output Sinks
//!
//! The coordinator publishes three streams: aggregated SELECT text (and
//! the "no records found" fallback), per-query per-partition live counts
//! as CSV rows, and worker-labeled change-log lines from UPDATE/DELETE.
//! Each stream goes to an injected sink so the core never touches a
//! concrete file handle.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Receives aggregated SELECT output and fallback messages
pub trait ResultsSink: Send {
    fn record_result(&mut self, text: &str) -> Result<()>;
}

/// Receives per-query per-partition live counts
pub trait MetricsSink: Send {
    fn record_live_counts(&mut self, counts: &[u64]) -> Result<()>;
}

/// Receives worker-labeled update/delete log lines
pub trait ChangeLogSink: Send {
    fn record_changes(&mut self, text: &str) -> Result<()>;
}

/// The three sinks a coordinator writes to
pub struct SinkSet {
    pub results: Box<dyn ResultsSink>,
    pub metrics: Box<dyn MetricsSink>,
    pub changes: Box<dyn ChangeLogSink>,
}

impl SinkSet {
    /// Sinks that discard everything
    pub fn null() -> Self {
        Self {
            results: Box::new(NullSink),
            metrics: Box::new(NullSink),
            changes: Box::new(NullSink),
        }
    }
}

/// Render a live-count vector as one CSV row
pub fn counts_csv(counts: &[u64]) -> String {
    counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Sink that discards its input
pub struct NullSink;

impl ResultsSink for NullSink {
    fn record_result(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

impl MetricsSink for NullSink {
    fn record_live_counts(&mut self, _counts: &[u64]) -> Result<()> {
        Ok(())
    }
}

impl ChangeLogSink for NullSink {
    fn record_changes(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink; clones share one buffer so tests can hand a clone to
/// the coordinator and keep one to inspect
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("sink lock poisoned").clone()
    }

    fn push(&self, entry: String) {
        self.entries.lock().expect("sink lock poisoned").push(entry);
    }
}

impl ResultsSink for MemorySink {
    fn record_result(&mut self, text: &str) -> Result<()> {
        self.push(text.to_string());
        Ok(())
    }
}

impl MetricsSink for MemorySink {
    fn record_live_counts(&mut self, counts: &[u64]) -> Result<()> {
        self.push(counts_csv(counts));
        Ok(())
    }
}

impl ChangeLogSink for MemorySink {
    fn record_changes(&mut self, text: &str) -> Result<()> {
        self.push(text.to_string());
        Ok(())
    }
}

/// Sink backed by any writer (file, stdout, ...)
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> ResultsSink for WriterSink<W> {
    fn record_result(&mut self, text: &str) -> Result<()> {
        // SELECT output already carries one newline per row; the fallback
        // message does not, so normalize to exactly one trailing newline.
        if text.ends_with('\n') {
            self.writer.write_all(text.as_bytes())?;
        } else {
            writeln!(self.writer, "{}", text)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> MetricsSink for WriterSink<W> {
    fn record_live_counts(&mut self, counts: &[u64]) -> Result<()> {
        writeln!(self.writer, "{}", counts_csv(counts))?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> ChangeLogSink for WriterSink<W> {
    fn record_changes(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
