//! Music service access
//!
//! The collector only talks to the service through [`MusicService`], so the
//! HTTP client can be swapped for [`MemoryService`] in offline runs and tests.
//! Pagination is hidden behind [`Pages`]: each call starts a fresh, lazily
//! fetched sequence.

mod client;
mod error;
mod memory;

pub use client::SpotifyClient;
pub use error::ServiceError;
pub use memory::{CreatedPlaylist, MemoryService};

use crate::model::{PlaylistItem, PlaylistSummary, RecommendationRequest, Record, TrackObject};

/// Lazily paginated results
pub type Pages<'a, T> = Box<dyn Iterator<Item = Result<T, ServiceError>> + 'a>;

/// Read access to public profiles and playlists
pub trait MusicService {
    /// Full public profile of a user
    fn fetch_profile(&self, user_id: &str) -> Result<Record, ServiceError>;

    /// Public playlists owned by (or followed by) a user, in service order
    fn fetch_playlists<'a>(&'a self, owner_id: &str) -> Pages<'a, PlaylistSummary>;

    /// Items of a playlist, in playlist order
    fn fetch_playlist_tracks<'a>(&'a self, playlist_id: &str) -> Pages<'a, PlaylistItem>;

    /// Display name of a user, falling back to the id when the profile has none
    fn display_name(&self, user_id: &str) -> Result<String, ServiceError> {
        let profile = self.fetch_profile(user_id)?;
        Ok(profile_display_name(&profile).unwrap_or_else(|| user_id.to_string()))
    }
}

/// Write access needed to build recommendation playlists
pub trait PlaylistEditor: MusicService {
    /// Tracks recommended for a validated request
    fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<TrackObject>, ServiceError>;

    /// Create an empty playlist for `user_id`, returning its id
    fn create_playlist(&self, user_id: &str, name: &str) -> Result<String, ServiceError>;

    /// Append tracks (by URI) to a playlist
    fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ServiceError>;
}

/// `display_name` field of a profile record, if it is a string
pub fn profile_display_name(profile: &Record) -> Option<String> {
    profile
        .get("display_name")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
