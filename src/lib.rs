//! Playlist Logger - change-tracked snapshots of public playlists
//!
//! This library periodically snapshots users' public profiles and
//! playlists as JSON files and keeps a human-readable log of every change.

pub mod collect;
pub mod config;
pub mod model;
pub mod recommend;
pub mod spotify;
pub mod store;

pub use collect::{CollectConfig, Collector};
pub use config::Credentials;
pub use store::SnapshotStore;
