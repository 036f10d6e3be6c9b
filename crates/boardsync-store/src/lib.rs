mod local;
mod partial;

pub use local::LocalStore;
pub use partial::PartialFile;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// Destination for downloaded files.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `data` as `file_name` inside `folder` and return the final path.
    ///
    /// Existing files are never overwritten: a numbered variant of the name
    /// is used instead. Nothing is left behind under any name if the write
    /// fails.
    async fn put(&self, folder: &Path, file_name: &str, data: Bytes) -> Result<PathBuf, StoreError>;
}

/// Reject names that would escape the target folder.
pub fn validate_file_name(file_name: &str) -> Result<(), StoreError> {
    if file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0'])
    {
        return Err(StoreError::InvalidName(file_name.to_string()));
    }
    Ok(())
}
