use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Filesystem primitives the logger writes through
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Create the file, and any missing parent directories, if absent.
    /// Existing content must be left untouched.
    async fn ensure_file(&self, path: &Path) -> Result<()>;

    /// Append `text` to the end of the file with a single write.
    async fn append(&self, path: &Path, text: &str) -> Result<()>;
}

/// [`LogSink`] backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

#[async_trait]
impl LogSink for FsSink {
    async fn ensure_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    async fn append(&self, path: &Path, text: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .await
            .map_err(|e| Error::io(path, e))?;

        file.write_all(text.as_bytes())
            .await
            .map_err(|e| Error::io(path, e))?;
        file.flush().await.map_err(|e| Error::io(path, e))
    }
}

/// Ensure the file exists, then append. The append never starts if ensuring failed.
pub(crate) async fn ensure_and_append(sink: &dyn LogSink, path: &Path, text: &str) -> Result<()> {
    sink.ensure_file(path).await?;
    sink.append(path, text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_creates_parents_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("logs.log");

        FsSink.ensure_file(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_ensure_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs.log");
        std::fs::write(&path, "earlier line\n").unwrap();

        FsSink.ensure_file(&path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier line\n");
    }

    #[tokio::test]
    async fn test_append_adds_to_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.log");

        ensure_and_append(&FsSink, &path, "one\n").await.unwrap();
        ensure_and_append(&FsSink, &path, "two\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_append_without_ensure_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.log");

        let result = FsSink.append(&path, "line\n").await;
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
