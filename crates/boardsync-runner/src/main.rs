use std::io::Read;

use anyhow::{Context, Result};
use boardsync_runner::config::RunnerConfig;
use boardsync_runner::dispatch::{self, Reply};
use boardsync_runner::protocol::Response;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries only the JSON response
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("boardsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RunnerConfig::parse();
    info!("boardsync starting (api: {})", config.api_url);

    let reply = match read_input(&config) {
        Ok(raw) => dispatch::handle(&config, &raw).await,
        Err(e) => Reply {
            response: Response::parse_error(format!("{e:#}")),
            malformed: true,
        },
    };

    let out = if config.compact {
        serde_json::to_string(&reply.response)?
    } else {
        serde_json::to_string_pretty(&reply.response)?
    };
    println!("{out}");

    let code = reply.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn read_input(config: &RunnerConfig) -> Result<String> {
    match &config.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("read stdin")?;
            Ok(raw)
        }
    }
}
