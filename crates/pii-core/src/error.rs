use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Log line is empty")]
    EmptyLine,

    #[error("Log line is {len} bytes, limit is {max}")]
    LineTooLong { len: usize, max: usize },

    #[error("Log line contains an embedded newline")]
    EmbeddedNewline,

    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timestamp formatting error: {0}")]
    Timestamp(#[from] time::error::Format),
}

pub type Result<T> = std::result::Result<T, CoreError>;
