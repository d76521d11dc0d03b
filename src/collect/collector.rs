//! Collection pipeline

use super::config::CollectConfig;
use crate::model::{PlaylistSnapshot, PlaylistSummary, TrackEntry};
use crate::spotify::{profile_display_name, MusicService};
use crate::store::{resolve_dir, sanitize, SnapshotStore, StoreOutcome};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Snapshot file holding a user's profile
pub const ACCOUNT_INFO_FILE: &str = "account_info";

/// What a run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Snapshot files that were written
    pub written: Vec<PathBuf>,

    /// Number of records that matched their stored snapshot
    pub unchanged: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: StoreOutcome) {
        match outcome {
            StoreOutcome::Written { path, .. } => self.written.push(path),
            StoreOutcome::Unchanged => self.unchanged += 1,
        }
    }

    fn merge(&mut self, other: RunSummary) {
        self.written.extend(other.written);
        self.unchanged += other.unchanged;
    }
}

/// Main collection pipeline
pub struct Collector<S: MusicService> {
    config: CollectConfig,
    service: S,
    store: SnapshotStore,
}

impl<S: MusicService> Collector<S> {
    /// Create a new collector
    pub fn new(config: CollectConfig, service: S) -> Self {
        Self {
            config,
            service,
            store: SnapshotStore::new(),
        }
    }

    /// Use a specific snapshot store
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = store;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    /// Collect every configured user. The first failure aborts the run.
    pub fn run(&self) -> Result<RunSummary> {
        log::info!(
            "Collecting {} user(s) into {:?}",
            self.config.user_ids.len(),
            self.config.data_dir
        );

        let mut summary = RunSummary::default();
        for user_id in &self.config.user_ids {
            let user_summary = self
                .collect_user(user_id)
                .with_context(|| format!("Failed to collect user {}", user_id))?;
            summary.merge(user_summary);
        }

        log::info!(
            "Run complete: {} snapshot(s) written, {} unchanged",
            summary.written.len(),
            summary.unchanged
        );
        Ok(summary)
    }

    /// Snapshot one user's profile and all of their playlists
    pub fn collect_user(&self, user_id: &str) -> Result<RunSummary> {
        let profile = self
            .service
            .fetch_profile(user_id)
            .with_context(|| format!("Failed to fetch profile of {}", user_id))?;
        let display_name = profile_display_name(&profile).unwrap_or_else(|| user_id.to_string());
        log::info!("User: {}", display_name);

        let user_dir = resolve_dir(&self.config.data_dir, user_id, &display_name)?;

        let mut summary = RunSummary::default();
        summary.record(self.store.store(&profile, &user_dir.join(ACCOUNT_INFO_FILE))?);

        // Adder display names, looked up once per user
        let mut adders: HashMap<String, String> = HashMap::new();

        for playlist in self.service.fetch_playlists(user_id) {
            let playlist =
                playlist.with_context(|| format!("Failed to list playlists of {}", user_id))?;
            let outcome = self.collect_playlist(&user_dir, &playlist, &mut adders)?;
            summary.record(outcome);
        }

        Ok(summary)
    }

    fn collect_playlist(
        &self,
        user_dir: &Path,
        playlist: &PlaylistSummary,
        adders: &mut HashMap<String, String>,
    ) -> Result<StoreOutcome> {
        log::debug!("Playlist: {} ({})", playlist.name, playlist.id);

        let snapshot = self.playlist_snapshot(playlist, adders)?;
        if snapshot.is_empty() {
            log::debug!("Playlist {} has no tracks", playlist.id);
        }
        let path = user_dir.join(playlist_file_name(playlist));

        self.store
            .store(&snapshot.to_record()?, &path)
            .with_context(|| format!("Failed to store playlist {}", playlist.id))
    }

    /// Fetch a playlist's tracks and build the document to persist
    pub fn playlist_snapshot(
        &self,
        playlist: &PlaylistSummary,
        adders: &mut HashMap<String, String>,
    ) -> Result<PlaylistSnapshot> {
        let mut snapshot = PlaylistSnapshot::new(playlist);

        for item in self.service.fetch_playlist_tracks(&playlist.id) {
            let item = item
                .with_context(|| format!("Failed to fetch tracks of playlist {}", playlist.id))?;

            let added_by = match (&item.added_by, playlist.collaborative) {
                (Some(adder), true) => Some(self.adder_name(&adder.id, adders)?),
                _ => None,
            };

            match TrackEntry::from_item(&item, added_by) {
                Some(entry) => snapshot.add_song(entry),
                None => log::warn!(
                    "Skipping item without a track in playlist {} ({})",
                    playlist.name,
                    playlist.id
                ),
            }
        }

        Ok(snapshot)
    }

    fn adder_name(&self, adder_id: &str, adders: &mut HashMap<String, String>) -> Result<String> {
        if let Some(name) = adders.get(adder_id) {
            return Ok(name.clone());
        }
        let name = self
            .service
            .display_name(adder_id)
            .with_context(|| format!("Failed to look up user {}", adder_id))?;
        adders.insert(adder_id.to_string(), name.clone());
        Ok(name)
    }
}

/// Snapshot file name for a playlist: `<sanitized name>_<id>`
pub fn playlist_file_name(playlist: &PlaylistSummary) -> String {
    format!("{}_{}", sanitize(&playlist.name), playlist.id)
}
