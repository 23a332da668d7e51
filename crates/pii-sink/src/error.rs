//! Error types for pii-sink

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SinkError>;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to write a line containing a newline")]
    EmbeddedNewline,
}
