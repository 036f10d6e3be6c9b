use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("status update failed: {0}")]
    StatusUpdate(String),

    #[error("api error: {0}")]
    Api(String),
}

impl SyncError {
    /// Errors that end the whole run rather than a single group or item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }

    /// Short machine-readable tag used in per-group reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Auth(_) => "auth",
            SyncError::NotFound(_) => "not_found",
            SyncError::Config(_) => "config",
            SyncError::RateLimited(_) => "rate_limited",
            SyncError::Download(_) => "download",
            SyncError::StatusUpdate(_) => "status_update",
            SyncError::Api(_) => "api",
        }
    }
}
