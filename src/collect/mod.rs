//! Collection runs: walk users and their playlists into the snapshot store

pub mod collector;
pub mod config;

pub use collector::{Collector, RunSummary, ACCOUNT_INFO_FILE};
pub use config::CollectConfig;
