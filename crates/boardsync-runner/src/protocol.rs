use std::collections::HashMap;

use boardsync_core::RunResult;
use serde::{Deserialize, Serialize};

pub const DOWNLOAD_ATTACHMENTS: &str = "download_attachments";

/// Capability echoed when the request could not be read at all.
pub const UNKNOWN_CAPABILITY: &str = "unknown";

/// Request envelope read from stdin or `--input`.
#[derive(Debug, Deserialize)]
pub struct Request {
    pub capability: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Arguments of `download_attachments`.
#[derive(Clone, Deserialize)]
pub struct DownloadArgs {
    pub api_token: String,
    pub workspace_name: String,
    pub board_name: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub group_folder_map: HashMap<String, String>,
}

// Manual Debug keeps the token out of logs.
impl std::fmt::Debug for DownloadArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadArgs")
            .field("api_token", &"<redacted>")
            .field("workspace_name", &self.workspace_name)
            .field("board_name", &self.board_name)
            .field("groups", &self.groups)
            .field("group_folder_map", &self.group_folder_map)
            .finish()
    }
}

/// Response envelope written to stdout.
#[derive(Debug, Serialize)]
pub struct Response {
    pub success: bool,
    pub result: RunResult,
    pub error: Option<String>,
    pub capability: String,
}

impl Response {
    pub fn success(capability: &str, result: RunResult) -> Self {
        Self {
            success: true,
            result,
            error: None,
            capability: capability.into(),
        }
    }

    pub fn error(capability: &str, result: RunResult, message: String) -> Self {
        Self {
            success: false,
            result,
            error: Some(message),
            capability: capability.into(),
        }
    }

    pub fn unknown_capability(capability: &str) -> Self {
        Self::error(
            capability,
            RunResult::default(),
            format!("unknown capability: {capability}"),
        )
    }

    pub fn parse_error(message: String) -> Self {
        Self::error(
            UNKNOWN_CAPABILITY,
            RunResult::default(),
            format!("Parse error: {message}"),
        )
    }
}
