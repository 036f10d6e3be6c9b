use boardsync_core::{RunResult, RunSettings};
use boardsync_service::MondayService;
use boardsync_store::LocalStore;
use chrono::Utc;
use tracing::{debug, error};

use crate::config::RunnerConfig;
use crate::pipeline;
use crate::protocol::{DownloadArgs, Request, Response, DOWNLOAD_ATTACHMENTS};

/// A response plus whether the request itself was unusable.
#[derive(Debug)]
pub struct Reply {
    pub response: Response,
    pub malformed: bool,
}

impl Reply {
    fn ok(response: Response) -> Self {
        Self {
            response,
            malformed: false,
        }
    }

    fn malformed(response: Response) -> Self {
        Self {
            response,
            malformed: true,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.malformed {
            1
        } else {
            0
        }
    }
}

/// Parse one raw request and run the capability it names.
pub async fn handle(config: &RunnerConfig, raw: &str) -> Reply {
    let request: Request = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            error!("malformed request: {e}");
            return Reply::malformed(Response::parse_error(e.to_string()));
        }
    };
    debug!("request: capability={}", request.capability);

    match request.capability.as_str() {
        DOWNLOAD_ATTACHMENTS => {
            let args: DownloadArgs = match serde_json::from_value(request.args) {
                Ok(a) => a,
                Err(e) => {
                    error!("invalid arguments: {e}");
                    return Reply::malformed(Response::error(
                        DOWNLOAD_ATTACHMENTS,
                        RunResult::default(),
                        format!("invalid args: {e}"),
                    ));
                }
            };
            Reply::ok(download_attachments(config, &args).await)
        }
        other => {
            error!("unknown capability: {other}");
            Reply::ok(Response::unknown_capability(other))
        }
    }
}

async fn download_attachments(config: &RunnerConfig, args: &DownloadArgs) -> Response {
    let settings = RunSettings::default();
    let service = match MondayService::new(config.monday_config(&args.api_token, &settings)) {
        Ok(s) => s,
        Err(e) => {
            return Response::error(DOWNLOAD_ATTACHMENTS, RunResult::default(), e.to_string())
        }
    };

    let outcome = pipeline::run(&service, &LocalStore::new(), args, &settings, Utc::now()).await;
    match outcome.error {
        None => Response::success(DOWNLOAD_ATTACHMENTS, outcome.result),
        Some(e) => Response::error(DOWNLOAD_ATTACHMENTS, outcome.result, e.to_string()),
    }
}
