use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::Group;
use crate::settings::TimestampField;

pub type ItemId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub group: Group,
    /// Text of the status column; empty when unset.
    pub status: String,
    /// Text of the email column; empty when unset or the board has none.
    pub email: String,
    /// Raw ISO 8601 timestamps as returned by the API.
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Item {
    /// Parse the selected timestamp. `None` when missing or malformed.
    pub fn timestamp(&self, field: TimestampField) -> Option<DateTime<Utc>> {
        let raw = match field {
            TimestampField::CreatedAt => self.created_at.as_deref(),
            TimestampField::UpdatedAt => self.updated_at.as_deref(),
        }?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    /// Original filename, possibly including its extension.
    pub name: String,
    /// Extension reported by the API, with or without a leading dot.
    pub file_extension: Option<String>,
    pub public_url: Option<String>,
}
