use serde::{Deserialize, Serialize};

use crate::board::BoardId;
use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOutcome {
    Processed,
    Failed,
}

/// Outcome of one item: downloaded and marked, or the reason it was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Success,
    Failed(SyncError),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub folder: Option<String>,
    pub outcome: GroupOutcome,
    pub success: u32,
    pub failed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GroupReport {
    pub fn processed(name: &str, folder: &str) -> Self {
        Self {
            name: name.to_string(),
            folder: Some(folder.to_string()),
            outcome: GroupOutcome::Processed,
            success: 0,
            failed: 0,
            error: None,
        }
    }

    /// A group that could not be processed counts as a single failure.
    pub fn failed(name: &str, folder: Option<&str>, err: &SyncError) -> Self {
        Self {
            name: name.to_string(),
            folder: folder.map(String::from),
            outcome: GroupOutcome::Failed,
            success: 0,
            failed: 1,
            error: Some(err.to_string()),
        }
    }

    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Success => self.success += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Aggregate for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub groups_processed: u32,
    pub total_groups: u32,
    pub success: u32,
    pub failed: u32,
    pub board_id: Option<BoardId>,
    #[serde(default)]
    pub groups: Vec<GroupReport>,
}

impl RunResult {
    pub fn new(total_groups: usize) -> Self {
        Self {
            total_groups: u32::try_from(total_groups).unwrap_or(u32::MAX),
            ..Default::default()
        }
    }

    pub fn add_group(&mut self, report: GroupReport) {
        if report.outcome == GroupOutcome::Processed {
            self.groups_processed += 1;
        }
        self.success += report.success;
        self.failed += report.failed;
        self.groups.push(report);
    }
}
