use std::fmt;

use serde::{Deserialize, Serialize};

/// Items with this status (or an empty one) are picked up.
pub const TARGET_STATUS: &str = "Retry";
/// Status written back after a successful download.
pub const NEW_STATUS: &str = "In Queue";
/// 0 = today only, 1 = today and yesterday, etc.
pub const DAYS_TO_PROCESS: u32 = 1;
pub const STATUS_COLUMN_TITLE: &str = "Status";
pub const EMAIL_COLUMN_TITLE: &str = "Email";

/// Which item timestamp the recency window applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl TimestampField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampField::CreatedAt => "created_at",
            TimestampField::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for TimestampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub target_status: String,
    pub new_status: String,
    pub days_to_process: u32,
    pub status_column_title: String,
    pub email_column_title: String,
    pub timestamp_field: TimestampField,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            target_status: TARGET_STATUS.into(),
            new_status: NEW_STATUS.into(),
            days_to_process: DAYS_TO_PROCESS,
            status_column_title: STATUS_COLUMN_TITLE.into(),
            email_column_title: EMAIL_COLUMN_TITLE.into(),
            timestamp_field: TimestampField::default(),
        }
    }
}
