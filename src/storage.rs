//! Generated-file store.
//!
//! Deliverables live in a flat directory, one file per order, named after
//! the trade number. The store resolves deterministic paths and reads
//! file content for the download gate.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{AppError, Result};

/// Content type for the .docx deliverables
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Attachment filename for an order's deliverable
pub fn download_filename(trade_no: &str) -> String {
    format!("{}.docx", trade_no)
}

/// Filesystem store for generated deliverables
pub struct GeneratedFileStore {
    base_path: PathBuf,
}

impl GeneratedFileStore {
    /// Create a store rooted at the configured generated-files directory
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Deterministic path of an order's deliverable
    pub fn deliverable_path(&self, trade_no: &str) -> PathBuf {
        self.base_path.join(download_filename(trade_no))
    }

    /// Whether a regular file exists at the given path
    pub async fn file_exists(&self, path: &Path) -> bool {
        matches!(fs::metadata(path).await, Ok(meta) if meta.is_file())
    }

    /// Read a deliverable's full content
    pub async fn read(&self, path: &Path) -> Result<Bytes> {
        let content = fs::read(path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(Bytes::from(content))
    }
}
