use boardsync_core::{Attachment, Column, Group, Item, SyncError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Field selection shared by `items_page` and `next_items_page`.
const ITEM_FIELDS: &str = "id name created_at updated_at group { id title } \
     column_values { id text } assets { id name file_extension public_url }";

pub const WORKSPACES_QUERY: &str =
    "query ($page: Int!) { workspaces(limit: 100, page: $page) { id name } }";

pub const BOARDS_QUERY: &str = "query ($workspace: [ID!], $page: Int!) { \
     boards(workspace_ids: $workspace, limit: 100, page: $page) { id name } }";

pub const LAYOUT_QUERY: &str = "query ($board: [ID!]) { \
     boards(ids: $board) { columns { id title type } groups { id title } } }";

pub const STATUS_MUTATION: &str = "mutation ($board: ID!, $item: ID!, $column: String!, $value: String) { \
     change_simple_column_value(board_id: $board, item_id: $item, column_id: $column, value: $value) { id } }";

pub fn first_items_query() -> String {
    format!(
        "query ($board: [ID!], $groups: [String], $limit: Int!) {{ boards(ids: $board) {{ \
         groups(ids: $groups) {{ id title items_page(limit: $limit) {{ cursor items {{ {ITEM_FIELDS} }} }} }} }} }}"
    )
}

pub fn next_items_query() -> String {
    format!(
        "query ($cursor: String!, $limit: Int!) {{ \
         next_items_page(cursor: $cursor, limit: $limit) {{ cursor items {{ {ITEM_FIELDS} }} }} }}"
    )
}

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
    /// Monday reports some failures outside the `errors` array.
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

const AUTH_CODES: &[&str] = &["UserUnauthorizedException", "Unauthorized", "USER_UNAUTHORIZED"];
const RATE_LIMIT_CODES: &[&str] = &[
    "RATE_LIMIT_EXCEEDED",
    "ComplexityException",
    "COMPLEXITY_BUDGET_EXHAUSTED",
    "maxConcurrencyExceeded",
];

fn classify_code(code: &str, message: String) -> SyncError {
    if AUTH_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        SyncError::Auth(message)
    } else if RATE_LIMIT_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        SyncError::RateLimited(message)
    } else {
        SyncError::Api(message)
    }
}

/// Map a non-2xx HTTP response onto the error taxonomy.
pub fn classify_http(status: StatusCode, body: &str) -> SyncError {
    let msg = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v["error_message"]
                .as_str()
                .or_else(|| v["errors"][0]["message"].as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "no error body".to_string()
            } else {
                body.to_string()
            }
        });
    let msg = format!("HTTP {}: {msg}", status.as_u16());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(msg),
        StatusCode::TOO_MANY_REQUESTS => SyncError::RateLimited(msg),
        _ => SyncError::Api(msg),
    }
}

/// Turn a GraphQL envelope into its data or a classified error.
pub fn into_data<T>(resp: GraphQlResponse<T>) -> Result<T, SyncError> {
    if let Some(first) = resp.errors.first() {
        let message = resp
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(match first.code() {
            Some(code) => classify_code(code, message),
            None => SyncError::Api(message),
        });
    }
    if let Some(code) = resp.error_code {
        let message = resp.error_message.unwrap_or_else(|| code.clone());
        return Err(classify_code(&code, message));
    }
    resp.data
        .ok_or_else(|| SyncError::Api("response has no data".into()))
}

/// Monday returns ids as strings, but numbers are accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Num(u64),
    Str(String),
}

impl RawId {
    pub fn to_u64(&self) -> Result<u64, SyncError> {
        match self {
            RawId::Num(n) => Ok(*n),
            RawId::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| SyncError::Api(format!("non-numeric id: {s:?}"))),
        }
    }
}

// -- Response shapes --

#[derive(Debug, Deserialize)]
pub struct WorkspacesData {
    #[serde(default)]
    pub workspaces: Vec<RawNamed>,
}

#[derive(Debug, Deserialize)]
pub struct BoardsData {
    #[serde(default)]
    pub boards: Vec<RawNamed>,
}

#[derive(Debug, Deserialize)]
pub struct RawNamed {
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LayoutData {
    #[serde(default)]
    pub boards: Vec<RawLayout>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLayout {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

#[derive(Debug, Deserialize)]
pub struct FirstItemsData {
    #[serde(default)]
    pub boards: Vec<RawGroupsBoard>,
}

#[derive(Debug, Deserialize)]
pub struct RawGroupsBoard {
    #[serde(default)]
    pub groups: Vec<RawGroupPage>,
}

#[derive(Debug, Deserialize)]
pub struct RawGroupPage {
    pub id: String,
    pub items_page: RawItemsPage,
}

#[derive(Debug, Deserialize)]
pub struct NextItemsData {
    pub next_items_page: RawItemsPage,
}

#[derive(Debug, Deserialize)]
pub struct RawItemsPage {
    pub cursor: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
pub struct RawItem {
    pub id: RawId,
    #[serde(default)]
    pub name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub group: Option<Group>,
    #[serde(default)]
    pub column_values: Vec<RawColumnValue>,
    #[serde(default)]
    pub assets: Vec<RawAsset>,
}

#[derive(Debug, Deserialize)]
pub struct RawColumnValue {
    pub id: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawAsset {
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: String,
    pub file_extension: Option<String>,
    pub public_url: Option<String>,
}

impl RawItem {
    fn column_text(&self, column_id: Option<&str>) -> String {
        let Some(column_id) = column_id else {
            return String::new();
        };
        self.column_values
            .iter()
            .find(|cv| cv.id == column_id)
            .and_then(|cv| cv.text.as_deref())
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    }

    /// Convert into the domain item. Assets without an id are dropped.
    pub fn into_item(
        self,
        fallback_group: &Group,
        status_column: &str,
        email_column: Option<&str>,
    ) -> Result<Item, SyncError> {
        let status = self.column_text(Some(status_column));
        let email = self.column_text(email_column);
        let id = self.id.to_u64()?;
        let mut attachments = Vec::with_capacity(self.assets.len());
        for asset in self.assets {
            let Some(asset_id) = asset.id else {
                tracing::warn!("item {id}: skipping asset with no id");
                continue;
            };
            attachments.push(Attachment {
                id: asset_id.to_u64()?,
                name: asset.name,
                file_extension: asset.file_extension.filter(|e| !e.is_empty()),
                public_url: asset
                    .public_url
                    .filter(|u| !u.is_empty() && u != "null"),
            });
        }
        Ok(Item {
            id,
            name: self.name,
            group: self.group.unwrap_or_else(|| fallback_group.clone()),
            status,
            email,
            created_at: self.created_at,
            updated_at: self.updated_at,
            attachments,
        })
    }
}
