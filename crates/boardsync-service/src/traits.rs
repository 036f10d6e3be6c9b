use async_trait::async_trait;
use boardsync_core::{Attachment, BoardId, Item, ItemId, SyncError};
use bytes::Bytes;

/// Abstraction over the remote board API.
///
/// The runner programs against this trait.
/// `MondayService` talks to the Monday.com GraphQL endpoint.
/// `MockBoardService` keeps everything in memory for tests.
#[async_trait]
pub trait BoardService: Send + Sync {
    /// Find the board named `board_name` inside the workspace named
    /// `workspace_name`. `SyncError::NotFound` if either is missing.
    async fn resolve_board(
        &self,
        workspace_name: &str,
        board_name: &str,
    ) -> Result<BoardId, SyncError>;

    /// All items in the named groups, across every page, in API order.
    async fn list_items(
        &self,
        board_id: BoardId,
        group_names: &[String],
    ) -> Result<Vec<Item>, SyncError>;

    /// Set the column titled `status_column_title` to `value`.
    async fn update_status(
        &self,
        board_id: BoardId,
        item_id: ItemId,
        status_column_title: &str,
        value: &str,
    ) -> Result<(), SyncError>;

    async fn fetch_attachment_bytes(&self, attachment: &Attachment) -> Result<Bytes, SyncError>;
}
