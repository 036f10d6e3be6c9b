pub mod config;
pub mod dispatch;
pub mod downloader;
pub mod pipeline;
pub mod protocol;
