//! Append-only file sink

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{LineSink, Result, SinkError};

/// Appends lines to a file opened in append mode.
///
/// All writes go through one handle behind a mutex, so concurrent
/// requests never interleave partial lines. Each append runs in its own
/// task, so a cancelled caller cannot leave half a batch in the file.
pub struct FileSink {
    path: PathBuf,
    file: Arc<Mutex<File>>,
    sync_every_write: bool,
}

impl FileSink {
    /// Open (or create) `path` for appending, creating parent directories
    pub async fn open(path: impl AsRef<Path>, sync_every_write: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(&path, source))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| io_error(&path, source))?;

        debug!("Opened output file {}", path.display());

        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
            sync_every_write,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl LineSink for FileSink {
    async fn append(&self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut buf = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            if line.contains('\n') {
                return Err(SinkError::EmbeddedNewline);
            }
            buf.push_str(line);
            buf.push('\n');
        }

        let file = Arc::clone(&self.file);
        let sync = self.sync_every_write;
        let write = tokio::spawn(async move {
            let mut file = file.lock().await;
            file.write_all(buf.as_bytes()).await?;
            file.flush().await?;
            if sync {
                file.sync_data().await?;
            }
            Ok::<_, std::io::Error>(())
        });

        write
            .await
            .map_err(|e| io_error(&self.path, std::io::Error::other(e)))?
            .map_err(|source| io_error(&self.path, source))
    }

    async fn flush(&self) -> Result<()> {
        let mut file = self.file.lock().await;
        file.flush()
            .await
            .map_err(|source| io_error(&self.path, source))?;
        file.sync_data()
            .await
            .map_err(|source| io_error(&self.path, source))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
