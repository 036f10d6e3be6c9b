use std::path::PathBuf;
use std::time::Duration;

use boardsync_core::RunSettings;
use boardsync_service::{MondayConfig, DEFAULT_API_URL};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "boardsync", about = "Download Monday.com attachments for review")]
pub struct RunnerConfig {
    /// Read the request from this file instead of stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Monday GraphQL endpoint
    #[arg(long, env = "MONDAY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request HTTP timeout (seconds)
    #[arg(long, env = "BOARDSYNC_HTTP_TIMEOUT", default_value = "60")]
    pub timeout: u64,

    /// Print the response as a single line of JSON
    #[arg(long)]
    pub compact: bool,
}

impl RunnerConfig {
    /// Client settings for one run. The token comes from the request body.
    pub fn monday_config(&self, api_token: &str, settings: &RunSettings) -> MondayConfig {
        let mut config = MondayConfig::new(api_token);
        config.api_url = self.api_url.trim_end_matches('/').to_string();
        config.timeout = Duration::from_secs(self.timeout);
        config.status_column_title = settings.status_column_title.clone();
        config.email_column_title = settings.email_column_title.clone();
        config
    }
}
