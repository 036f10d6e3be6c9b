use std::path::Path;

use boardsync_core::filter::{filter_items, FilterCriteria};
use boardsync_core::{BoardId, GroupReport, Item, ItemOutcome, RunResult, RunSettings, SyncError};
use boardsync_service::BoardService;
use boardsync_store::FileStore;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::downloader;
use crate::protocol::DownloadArgs;

/// Result of one run: the aggregate counts plus the error that aborted the
/// run, if any. Per-group and per-item failures are only counted.
#[derive(Debug)]
pub struct RunOutcome {
    pub result: RunResult,
    pub error: Option<SyncError>,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything an item needs that stays fixed for the run.
struct RunContext<'a> {
    service: &'a dyn BoardService,
    store: &'a dyn FileStore,
    settings: &'a RunSettings,
    board_id: BoardId,
}

/// Execute one `download_attachments` run.
///
/// Groups are handled in caller order, one item at a time.
pub async fn run(
    service: &dyn BoardService,
    store: &dyn FileStore,
    args: &DownloadArgs,
    settings: &RunSettings,
    now: DateTime<Utc>,
) -> RunOutcome {
    info!(
        "starting run: workspace={}, board={}, groups={}",
        args.workspace_name,
        args.board_name,
        args.groups.len()
    );

    // 1. Resolve board; nothing else happens without it
    let board_id = match service
        .resolve_board(&args.workspace_name, &args.board_name)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            error!("board resolution failed: {e}");
            return RunOutcome {
                result: RunResult::default(),
                error: Some(e),
            };
        }
    };
    info!("resolved board '{}' to {board_id}", args.board_name);

    let ctx = RunContext {
        service,
        store,
        settings,
        board_id,
    };
    let criteria = FilterCriteria::from(settings);
    let mut result = RunResult::new(args.groups.len());
    result.board_id = Some(board_id);

    // 2. Groups, sequentially
    let mut fatal = None;
    for group_name in &args.groups {
        // A blank folder would resolve to the working directory
        let folder = args
            .group_folder_map
            .get(group_name)
            .map(|f| f.trim())
            .filter(|f| !f.is_empty());
        let report = match folder {
            None => {
                let err = SyncError::Config(format!("no folder mapping for group {group_name}"));
                warn!("{err}");
                GroupReport::failed(group_name, None, &err)
            }
            Some(folder) => {
                let (report, abort) = process_group(&ctx, group_name, folder, &criteria, now).await;
                fatal = abort;
                report
            }
        };
        result.add_group(report);
        if fatal.is_some() {
            break;
        }
    }

    // 3. Summary
    info!(
        "run finished: groups processed {}/{}, success {}, failed {}",
        result.groups_processed, result.total_groups, result.success, result.failed
    );
    if let Some(e) = &fatal {
        error!("run aborted: {e}");
    }

    RunOutcome {
        result,
        error: fatal,
    }
}

/// Process one group. The second element is set when an error must abort
/// the whole run.
async fn process_group(
    ctx: &RunContext<'_>,
    group_name: &str,
    folder: &str,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> (GroupReport, Option<SyncError>) {
    info!("processing group '{group_name}' into {folder}");

    let items = match ctx
        .service
        .list_items(ctx.board_id, &[group_name.to_string()])
        .await
    {
        Ok(items) => items,
        Err(e) => {
            error!("failed to list items for group '{group_name}': {e}");
            let report = GroupReport::failed(group_name, Some(folder), &e);
            let abort = e.is_fatal().then_some(e);
            return (report, abort);
        }
    };

    let listed = items.len();
    let selected = filter_items(items, criteria, now);
    info!(
        "group '{group_name}': {} of {listed} item(s) selected",
        selected.len()
    );

    let mut report = GroupReport::processed(group_name, folder);
    for item in &selected {
        let outcome = process_item(ctx, item, group_name, Path::new(folder), now).await;
        report.record(&outcome);
        if let ItemOutcome::Failed(e) = outcome {
            if e.is_fatal() {
                return (report, Some(e));
            }
        }
    }

    info!(
        "group '{group_name}': {} succeeded, {} failed",
        report.success, report.failed
    );
    (report, None)
}

/// Download, then mark. A failed status write leaves the files in place.
async fn process_item(
    ctx: &RunContext<'_>,
    item: &Item,
    group_name: &str,
    folder: &Path,
    now: DateTime<Utc>,
) -> ItemOutcome {
    info!("processing item {} ({})", item.id, item.name);

    if let Err(e) = downloader::download_item(ctx.service, ctx.store, item, group_name, folder, now).await {
        warn!("item {}: download failed: {e}", item.id);
        return ItemOutcome::Failed(e);
    }

    if let Err(e) = ctx
        .service
        .update_status(
            ctx.board_id,
            item.id,
            &ctx.settings.status_column_title,
            &ctx.settings.new_status,
        )
        .await
    {
        warn!("item {}: downloaded but status update failed: {e}", item.id);
        return ItemOutcome::Failed(e);
    }

    info!("item {} done", item.id);
    ItemOutcome::Success
}
