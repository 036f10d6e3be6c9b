use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use boardsync_core::{Attachment, BoardId, Item, ItemId, SyncError};
use bytes::Bytes;

use crate::BoardService;

/// A status write observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWrite {
    pub board_id: BoardId,
    pub item_id: ItemId,
    pub column: String,
    pub value: String,
}

/// An in-memory board service for testing that records status writes
/// and returns configurable failures.
///
/// Status writes are applied to the stored items, so a second run sees
/// the updated statuses.
pub struct MockBoardService {
    boards: Vec<(String, String, BoardId)>,
    items: Mutex<Vec<Item>>,
    files: HashMap<u64, Bytes>,
    list_failures: HashMap<String, SyncError>,
    status_failures: HashSet<ItemId>,
    writes: Mutex<Vec<StatusWrite>>,
    fetches: Mutex<Vec<u64>>,
}

impl Default for MockBoardService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBoardService {
    pub fn new() -> Self {
        Self {
            boards: Vec::new(),
            items: Mutex::new(Vec::new()),
            files: HashMap::new(),
            list_failures: HashMap::new(),
            status_failures: HashSet::new(),
            writes: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_board(mut self, workspace: &str, board: &str, id: BoardId) -> Self {
        self.boards.push((workspace.into(), board.into(), id));
        self
    }

    pub fn with_item(self, item: Item) -> Self {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(item);
        self
    }

    pub fn with_file(mut self, asset_id: u64, data: &[u8]) -> Self {
        self.files.insert(asset_id, Bytes::copy_from_slice(data));
        self
    }

    /// Make `list_items` fail for the named group.
    pub fn with_list_failure(mut self, group: &str, err: SyncError) -> Self {
        self.list_failures.insert(group.into(), err);
        self
    }

    pub fn with_status_failure(mut self, item_id: ItemId) -> Self {
        self.status_failures.insert(item_id);
        self
    }

    pub fn status_writes(&self) -> Vec<StatusWrite> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Asset ids requested through `fetch_attachment_bytes`, in order.
    pub fn fetched_assets(&self) -> Vec<u64> {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn item_status(&self, item_id: ItemId) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.status.clone())
    }
}

#[async_trait]
impl BoardService for MockBoardService {
    async fn resolve_board(
        &self,
        workspace_name: &str,
        board_name: &str,
    ) -> Result<BoardId, SyncError> {
        if !self.boards.iter().any(|(ws, _, _)| ws == workspace_name) {
            return Err(SyncError::NotFound(format!("workspace '{workspace_name}'")));
        }
        self.boards
            .iter()
            .find(|(ws, b, _)| ws == workspace_name && b == board_name)
            .map(|(_, _, id)| *id)
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "board '{board_name}' in workspace '{workspace_name}'"
                ))
            })
    }

    async fn list_items(
        &self,
        _board_id: BoardId,
        group_names: &[String],
    ) -> Result<Vec<Item>, SyncError> {
        for name in group_names {
            if let Some(err) = self.list_failures.get(name) {
                return Err(err.clone());
            }
        }
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items
            .iter()
            .filter(|i| group_names.iter().any(|n| i.group.matches_name(n)))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        board_id: BoardId,
        item_id: ItemId,
        status_column_title: &str,
        value: &str,
    ) -> Result<(), SyncError> {
        if self.status_failures.contains(&item_id) {
            return Err(SyncError::StatusUpdate(format!(
                "item {item_id}: mock status failure"
            )));
        }
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
            item.status = value.to_string();
        }
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(StatusWrite {
                board_id,
                item_id,
                column: status_column_title.to_string(),
                value: value.to_string(),
            });
        Ok(())
    }

    async fn fetch_attachment_bytes(&self, attachment: &Attachment) -> Result<Bytes, SyncError> {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(attachment.id);
        self.files
            .get(&attachment.id)
            .cloned()
            .ok_or_else(|| SyncError::Download(format!("asset {} not found", attachment.id)))
    }
}
