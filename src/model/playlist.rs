use super::record::{to_record, Record};
use super::track::TrackEntry;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Playlist as it appears in a user's playlist listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub snapshot_id: Option<String>,

    /// Collaborative playlists also record who added each track
    #[serde(default)]
    pub collaborative: bool,
}

/// Persisted playlist document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSnapshot {
    /// Display name, unsanitized
    pub name: String,

    pub description: Option<String>,

    pub snapshot_id: Option<String>,

    pub playlist_id: String,

    /// Tracks in playlist order
    pub songs: Vec<TrackEntry>,
}

impl PlaylistSnapshot {
    /// Create a snapshot with the summary's metadata and no songs
    pub fn new(summary: &PlaylistSummary) -> Self {
        Self {
            name: summary.name.clone(),
            description: summary.description.clone(),
            snapshot_id: summary.snapshot_id.clone(),
            playlist_id: summary.id.clone(),
            songs: Vec::new(),
        }
    }

    /// Append a song
    pub fn add_song(&mut self, entry: TrackEntry) {
        self.songs.push(entry);
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Check if the snapshot has no songs
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Convert into the document that gets stored
    pub fn to_record(&self) -> Result<Record> {
        to_record(self)
    }
}
