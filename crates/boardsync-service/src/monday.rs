use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use boardsync_core::board::find_column;
use boardsync_core::settings::{EMAIL_COLUMN_TITLE, STATUS_COLUMN_TITLE};
use boardsync_core::{Attachment, BoardId, Group, Item, ItemId, SyncError};
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::graphql::{self, GraphQlRequest, GraphQlResponse, RawLayout};
use crate::BoardService;

pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";
const API_VERSION: &str = "2024-10";
const PAGE_LIMIT: u32 = 100;
/// Upper bound on pages fetched by any single paginated listing.
const MAX_PAGES: u32 = 500;

#[derive(Debug, Clone)]
pub struct MondayConfig {
    pub api_url: String,
    pub api_token: String,
    pub timeout: Duration,
    /// Title of the column whose text is read as `Item::status`.
    pub status_column_title: String,
    /// Title of the column whose text is read as `Item::email`.
    pub email_column_title: String,
}

impl MondayConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(60),
            status_column_title: STATUS_COLUMN_TITLE.into(),
            email_column_title: EMAIL_COLUMN_TITLE.into(),
        }
    }
}

/// Async GraphQL client for the Monday.com API.
pub struct MondayService {
    api_url: String,
    api_token: String,
    client: Client,
    status_column_title: String,
    email_column_title: String,
    /// Columns and groups per board, fetched once per run.
    layouts: Mutex<HashMap<BoardId, RawLayout>>,
}

impl MondayService {
    pub fn new(config: MondayConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("boardsync")
            .build()
            .map_err(|e| SyncError::Api(format!("HTTP client init: {e}")))?;
        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
            client,
            status_column_title: config.status_column_title,
            email_column_title: config.email_column_title,
            layouts: Mutex::new(HashMap::new()),
        })
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", self.api_token.as_str())
            .header("API-Version", API_VERSION)
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, SyncError> {
        let builder = self
            .client
            .post(&self.api_url)
            .json(&GraphQlRequest { query, variables });
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| SyncError::Api(format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SyncError::Api(format!("read body: {e}")))?;
        if !status.is_success() {
            return Err(graphql::classify_http(status, &body));
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&body)
            .map_err(|e| SyncError::Api(format!("json decode: {e}")))?;
        graphql::into_data(envelope)
    }

    async fn find_workspace_id(&self, workspace_name: &str) -> Result<u64, SyncError> {
        for page in 1..=MAX_PAGES {
            let data: graphql::WorkspacesData = self
                .graphql(graphql::WORKSPACES_QUERY, json!({ "page": page }))
                .await?;
            if data.workspaces.is_empty() {
                break;
            }
            for ws in data.workspaces {
                if ws.name == workspace_name {
                    if let Some(id) = ws.id {
                        return id.to_u64();
                    }
                }
            }
        }
        Err(SyncError::NotFound(format!("workspace '{workspace_name}'")))
    }

    async fn layout(&self, board_id: BoardId) -> Result<RawLayout, SyncError> {
        let mut cache = self.layouts.lock().await;
        if let Some(layout) = cache.get(&board_id) {
            return Ok(layout.clone());
        }
        let data: graphql::LayoutData = self
            .graphql(
                graphql::LAYOUT_QUERY,
                json!({ "board": [board_id.to_string()] }),
            )
            .await?;
        let layout = data
            .boards
            .into_iter()
            .next()
            .ok_or_else(|| SyncError::NotFound(format!("board {board_id}")))?;
        debug!(
            "board {board_id}: {} columns, {} groups",
            layout.columns.len(),
            layout.groups.len()
        );
        cache.insert(board_id, layout.clone());
        Ok(layout)
    }

    fn status_column_id(&self, layout: &RawLayout, title: &str, board_id: BoardId) -> Result<String, SyncError> {
        find_column(&layout.columns, title, "status")
            .map(|c| c.id.clone())
            .ok_or_else(|| SyncError::NotFound(format!("column '{title}' on board {board_id}")))
    }

    /// Fetch one group's items, following cursors until exhausted.
    async fn group_items(
        &self,
        board_id: BoardId,
        group: &Group,
        status_column: &str,
        email_column: Option<&str>,
    ) -> Result<Vec<Item>, SyncError> {
        let data: graphql::FirstItemsData = self
            .graphql(
                &graphql::first_items_query(),
                json!({
                    "board": [board_id.to_string()],
                    "groups": [group.id],
                    "limit": PAGE_LIMIT,
                }),
            )
            .await?;
        let mut page = data
            .boards
            .into_iter()
            .flat_map(|b| b.groups)
            .find(|g| g.id == group.id)
            .map(|g| g.items_page)
            .ok_or_else(|| {
                SyncError::NotFound(format!("group '{}' on board {board_id}", group.title))
            })?;

        let mut items = Vec::new();
        let next_query = graphql::next_items_query();
        for page_no in 1..=MAX_PAGES {
            debug!(
                "group '{}': page {page_no} with {} item(s)",
                group.title,
                page.items.len()
            );
            for raw in page.items {
                items.push(raw.into_item(group, status_column, email_column)?);
            }
            let Some(cursor) = page.cursor.filter(|c| !c.is_empty()) else {
                return Ok(items);
            };
            let data: graphql::NextItemsData = self
                .graphql(&next_query, json!({ "cursor": cursor, "limit": PAGE_LIMIT }))
                .await?;
            page = data.next_items_page;
        }
        warn!(
            "group '{}': stopped after {MAX_PAGES} pages, results may be incomplete",
            group.title
        );
        Ok(items)
    }

    async fn get_bytes(&self, builder: RequestBuilder, what: &str) -> Result<Bytes, SyncError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| SyncError::Download(format!("{what}: {e}")))?;
        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SyncError::RateLimited(format!("{what}: HTTP 429")));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body = if body.is_empty() { "no error body".into() } else { body };
            return Err(SyncError::Download(format!(
                "{what}: HTTP {}: {body}",
                status.as_u16()
            )));
        }
        resp.bytes()
            .await
            .map_err(|e| SyncError::Download(format!("{what}: read body: {e}")))
    }
}

#[async_trait]
impl BoardService for MondayService {
    async fn resolve_board(
        &self,
        workspace_name: &str,
        board_name: &str,
    ) -> Result<BoardId, SyncError> {
        let workspace_id = self.find_workspace_id(workspace_name).await?;
        info!("found workspace '{workspace_name}' (id {workspace_id})");

        for page in 1..=MAX_PAGES {
            let data: graphql::BoardsData = self
                .graphql(
                    graphql::BOARDS_QUERY,
                    json!({ "workspace": [workspace_id.to_string()], "page": page }),
                )
                .await?;
            if data.boards.is_empty() {
                break;
            }
            for board in data.boards {
                if board.name == board_name {
                    if let Some(id) = board.id {
                        return id.to_u64();
                    }
                }
            }
        }
        Err(SyncError::NotFound(format!(
            "board '{board_name}' in workspace '{workspace_name}'"
        )))
    }

    async fn list_items(
        &self,
        board_id: BoardId,
        group_names: &[String],
    ) -> Result<Vec<Item>, SyncError> {
        let layout = self.layout(board_id).await?;
        let status_column = self.status_column_id(&layout, &self.status_column_title, board_id)?;
        let email_column = find_column(&layout.columns, &self.email_column_title, "email")
            .map(|c| c.id.clone());
        if email_column.is_none() {
            warn!(
                "board {board_id} has no '{}' column, emails will be empty",
                self.email_column_title
            );
        }

        let mut items = Vec::new();
        for name in group_names {
            let group = layout
                .groups
                .iter()
                .find(|g| g.matches_name(name))
                .ok_or_else(|| SyncError::NotFound(format!("group '{name}' on board {board_id}")))?;
            let mut found = self
                .group_items(board_id, group, &status_column, email_column.as_deref())
                .await?;
            items.append(&mut found);
        }
        Ok(items)
    }

    async fn update_status(
        &self,
        board_id: BoardId,
        item_id: ItemId,
        status_column_title: &str,
        value: &str,
    ) -> Result<(), SyncError> {
        let layout = self.layout(board_id).await?;
        let column = self.status_column_id(&layout, status_column_title, board_id)?;
        let result: Result<serde_json::Value, SyncError> = self
            .graphql(
                graphql::STATUS_MUTATION,
                json!({
                    "board": board_id.to_string(),
                    "item": item_id.to_string(),
                    "column": column,
                    "value": value,
                }),
            )
            .await;
        match result {
            Ok(_) => {
                info!("status updated to '{value}' for item {item_id}");
                Ok(())
            }
            Err(e @ (SyncError::Auth(_) | SyncError::RateLimited(_))) => Err(e),
            Err(e) => Err(SyncError::StatusUpdate(format!("item {item_id}: {e}"))),
        }
    }

    async fn fetch_attachment_bytes(&self, attachment: &Attachment) -> Result<Bytes, SyncError> {
        if let Some(url) = attachment.public_url.as_deref() {
            debug!("downloading asset {} from public URL", attachment.id);
            match self
                .get_bytes(self.client.get(url), &format!("asset {}", attachment.id))
                .await
            {
                Ok(data) => return Ok(data),
                Err(e) => warn!("public URL failed ({e}), trying API file endpoint"),
            }
        }

        let builder = self
            .client
            .get(format!("{}/file", self.api_url))
            .query(&[("assetId", attachment.id.to_string())]);
        self.get_bytes(self.with_auth(builder), &format!("asset {}", attachment.id))
            .await
    }
}
