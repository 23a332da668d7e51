//! Output sinks for sanitized log lines
//!
//! This crate provides:
//! - The [`LineSink`] trait the engine writes through
//! - [`FileSink`]: append-only file output
//! - [`MemorySink`]: in-memory output for tests and dry runs

pub mod error;
pub mod file;
pub mod memory;

pub use error::{Result, SinkError};
pub use file::FileSink;
pub use memory::MemorySink;

use async_trait::async_trait;

/// Destination for sanitized lines
#[async_trait]
pub trait LineSink: Send + Sync {
    /// Append lines in order. Each line is written with a trailing newline
    /// and a batch is never interleaved with another caller's batch.
    async fn append(&self, lines: &[String]) -> Result<()>;

    /// Flush buffered data to durable storage
    async fn flush(&self) -> Result<()>;

    /// Human-readable destination, for logs
    fn describe(&self) -> String;
}
