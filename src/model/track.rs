use serde::{Deserialize, Serialize};

/// One item of a playlist's track listing, as returned by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// When the track was added (ISO 8601, may be missing for old playlists)
    #[serde(default)]
    pub added_at: Option<String>,

    /// The user who added the track
    #[serde(default)]
    pub added_by: Option<UserRef>,

    /// The track itself; `None` for removed or unavailable items
    #[serde(default)]
    pub track: Option<TrackObject>,
}

/// Reference to a user inside another object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
}

/// Track fields the collector cares about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackObject {
    /// Service track id (absent for local files)
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

/// A track as persisted inside a playlist snapshot
///
/// Field order here is the key order on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub added_at: Option<String>,

    /// Display name of the adder, only recorded for collaborative playlists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,

    pub song_name: String,

    pub artist_name: String,
}

impl TrackEntry {
    /// Build an entry from a listing item, or `None` if the item has no track
    pub fn from_item(item: &PlaylistItem, added_by: Option<String>) -> Option<Self> {
        let track = item.track.as_ref()?;
        Some(Self {
            added_at: item.added_at.clone(),
            added_by,
            song_name: track.name.clone(),
            artist_name: track
                .artists
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
        })
    }
}
