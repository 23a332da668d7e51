use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{LineSink, Result, SinkError};

/// Collects lines in memory
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub async fn lines(&self) -> Vec<String> {
        self.lines.lock().await.clone()
    }
}

#[async_trait]
impl LineSink for MemorySink {
    async fn append(&self, lines: &[String]) -> Result<()> {
        if lines.iter().any(|l| l.contains('\n')) {
            return Err(SinkError::EmbeddedNewline);
        }
        self.lines.lock().await.extend_from_slice(lines);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
