use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::{validate_file_name, FileStore, PartialFile, StoreError};

/// Give up looking for a free numbered name after this many attempts.
const MAX_VARIANTS: u32 = 10_000;

/// Writes files to the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }
}

/// `a.pdf` -> `a_{n}.pdf`; names without an extension just get the suffix.
fn numbered(file_name: &str, n: u32) -> String {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => format!("{}_{n}{}", &file_name[..pos], &file_name[pos..]),
        _ => format!("{file_name}_{n}"),
    }
}

async fn exists(path: &Path) -> Result<bool, StoreError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| StoreError::Internal(format!("exists {}: {e}", path.display())))
}

/// First path in `folder` not already taken: `name`, `name_1`, `name_2`, ...
async fn free_path(folder: &Path, file_name: &str) -> Result<PathBuf, StoreError> {
    let path = folder.join(file_name);
    if !exists(&path).await? {
        return Ok(path);
    }
    for n in 1..=MAX_VARIANTS {
        let path = folder.join(numbered(file_name, n));
        if !exists(&path).await? {
            return Ok(path);
        }
    }
    Err(StoreError::Internal(format!(
        "no free name for {file_name} in {}",
        folder.display()
    )))
}

#[async_trait]
impl FileStore for LocalStore {
    async fn put(&self, folder: &Path, file_name: &str, data: Bytes) -> Result<PathBuf, StoreError> {
        validate_file_name(file_name)?;
        tokio::fs::create_dir_all(folder)
            .await
            .map_err(|e| StoreError::Internal(format!("mkdir {}: {e}", folder.display())))?;

        let mut part = PartialFile::create(folder).await?;
        part.write_all(&data).await?;

        let target = free_path(folder, file_name).await?;
        part.commit(&target).await?;
        debug!("wrote {} bytes to {}", data.len(), target.display());
        Ok(target)
    }
}
