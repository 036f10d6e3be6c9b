use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::StoreError;

/// A file being written under a temporary `.part` name.
///
/// The temporary name does not embed the final one, so any name the
/// filesystem accepts can be committed.
///
/// The temporary file is removed when the guard is dropped without
/// [`PartialFile::commit`], so an interrupted or failed write never leaves a
/// file that looks complete.
pub struct PartialFile {
    path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl PartialFile {
    /// Create a fresh temporary file inside `folder`.
    pub async fn create(folder: &Path) -> Result<Self, StoreError> {
        let path = folder.join(format!(".{}.part", uuid::Uuid::new_v4().simple()));
        let file = File::create(&path)
            .await
            .map_err(|e| StoreError::Internal(format!("create {}: {e}", path.display())))?;
        Ok(Self {
            path,
            file: Some(file),
            committed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write_all(&mut self, data: &[u8]) -> Result<(), StoreError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StoreError::Internal("write after close".into()))?;
        file.write_all(data)
            .await
            .map_err(|e| StoreError::Internal(format!("write {}: {e}", self.path.display())))
    }

    /// Flush, sync and close, then move the file to `target`.
    pub async fn commit(mut self, target: &Path) -> Result<(), StoreError> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .await
                .map_err(|e| StoreError::Internal(format!("flush {}: {e}", self.path.display())))?;
            file.sync_all()
                .await
                .map_err(|e| StoreError::Internal(format!("sync {}: {e}", self.path.display())))?;
        }
        tokio::fs::rename(&self.path, target).await.map_err(|e| {
            StoreError::Internal(format!(
                "rename {} -> {}: {e}",
                self.path.display(),
                target.display()
            ))
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Close the handle before unlinking; Windows refuses otherwise.
        drop(self.file.take());
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove partial file {}: {e}", self.path.display()),
        }
    }
}
