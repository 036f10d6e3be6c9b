pub mod board;
pub mod error;
pub mod filter;
pub mod item;
pub mod naming;
pub mod run_result;
pub mod settings;

pub use board::{Board, BoardId, Column, Group, Workspace};
pub use error::SyncError;
pub use item::{Attachment, Item, ItemId};
pub use run_result::{GroupOutcome, GroupReport, ItemOutcome, RunResult};
pub use settings::{RunSettings, TimestampField};
