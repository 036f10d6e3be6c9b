use std::path::{Path, PathBuf};

use boardsync_core::naming::attachment_file_name;
use boardsync_core::{Item, SyncError};
use boardsync_service::BoardService;
use boardsync_store::FileStore;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Download every attachment of `item` into `folder`.
///
/// Stops at the first failure so the item stays selectable on the next run.
/// Files already written for the item are kept.
pub async fn download_item(
    service: &dyn BoardService,
    store: &dyn FileStore,
    item: &Item,
    group_name: &str,
    folder: &Path,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>, SyncError> {
    if item.attachments.is_empty() {
        warn!("item {} has no attachments", item.id);
        return Ok(Vec::new());
    }

    let mut written = Vec::with_capacity(item.attachments.len());
    for attachment in &item.attachments {
        let data = service.fetch_attachment_bytes(attachment).await?;
        let file_name = attachment_file_name(
            &attachment.name,
            attachment.file_extension.as_deref(),
            item.id,
            &item.email,
            group_name,
            now,
        );
        let path = store
            .put(folder, &file_name, data)
            .await
            .map_err(|e| SyncError::Download(format!("save {file_name}: {e}")))?;
        debug!("item {}: saved {}", item.id, path.display());
        written.push(path);
    }
    Ok(written)
}
