//! In-memory music service
//!
//! Serves profiles and playlists from memory and records playlist edits.
//! Listings are handed out in pages of `page_size` to mirror the real
//! service.

use super::error::ServiceError;
use super::{MusicService, Pages, PlaylistEditor};
use crate::model::{PlaylistItem, PlaylistSummary, RecommendationRequest, Record, TrackObject};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

const DEFAULT_PAGE_SIZE: usize = 2;

/// Playlist created through [`PlaylistEditor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub uris: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryService {
    profiles: HashMap<String, Record>,
    /// (owner id, playlist) in listing order
    playlists: Vec<(String, PlaylistSummary)>,
    tracks: HashMap<String, Vec<PlaylistItem>>,
    recommended: Vec<TrackObject>,
    page_size: usize,
    profile_lookups: Cell<usize>,
    pages_served: Cell<usize>,
    created: RefCell<Vec<CreatedPlaylist>>,
    requests: RefCell<Vec<RecommendationRequest>>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add or replace a profile; it must carry an `id` string
    pub fn add_profile(&mut self, profile: Record) {
        let id = profile
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        self.profiles.insert(id, profile);
    }

    /// Mutable access to a stored profile
    pub fn profile_mut(&mut self, user_id: &str) -> Option<&mut Record> {
        self.profiles.get_mut(user_id)
    }

    /// Add a playlist owned by `owner_id` with its items
    pub fn add_playlist(
        &mut self,
        owner_id: &str,
        summary: PlaylistSummary,
        items: Vec<PlaylistItem>,
    ) {
        self.tracks.insert(summary.id.clone(), items);
        self.playlists.push((owner_id.to_string(), summary));
    }

    /// Mutable access to a playlist's items
    pub fn tracks_mut(&mut self, playlist_id: &str) -> Option<&mut Vec<PlaylistItem>> {
        self.tracks.get_mut(playlist_id)
    }

    /// Mutable access to a playlist's summary
    pub fn playlist_mut(&mut self, playlist_id: &str) -> Option<&mut PlaylistSummary> {
        self.playlists
            .iter_mut()
            .map(|(_, summary)| summary)
            .find(|summary| summary.id == playlist_id)
    }

    /// Tracks returned by every recommendation request
    pub fn set_recommendations(&mut self, tracks: Vec<TrackObject>) {
        self.recommended = tracks;
    }

    /// Number of profile fetches served so far
    pub fn profile_lookups(&self) -> usize {
        self.profile_lookups.get()
    }

    /// Number of listing pages served so far
    pub fn pages_served(&self) -> usize {
        self.pages_served.get()
    }

    /// Recommendation requests received so far
    pub fn recommendation_requests(&self) -> Vec<RecommendationRequest> {
        self.requests.borrow().clone()
    }

    /// Playlists created through [`PlaylistEditor`]
    pub fn created_playlists(&self) -> Vec<CreatedPlaylist> {
        self.created.borrow().clone()
    }

    fn paged<'a, T: Clone + 'a>(&'a self, items: Vec<T>) -> Pages<'a, T> {
        let page_size = self.page_size;
        let mut served = 0usize;
        Box::new(items.into_iter().map(move |item| {
            if served % page_size == 0 {
                self.pages_served.set(self.pages_served.get() + 1);
            }
            served += 1;
            Ok(item)
        }))
    }
}

impl MusicService for MemoryService {
    fn fetch_profile(&self, user_id: &str) -> Result<Record, ServiceError> {
        self.profile_lookups.set(self.profile_lookups.get() + 1);
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))
    }

    fn fetch_playlists<'a>(&'a self, owner_id: &str) -> Pages<'a, PlaylistSummary> {
        let owned: Vec<PlaylistSummary> = self
            .playlists
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, summary)| summary.clone())
            .collect();
        self.paged(owned)
    }

    fn fetch_playlist_tracks<'a>(&'a self, playlist_id: &str) -> Pages<'a, PlaylistItem> {
        match self.tracks.get(playlist_id) {
            Some(items) => self.paged(items.clone()),
            None => Box::new(std::iter::once(Err(ServiceError::NotFound(format!(
                "playlist {}",
                playlist_id
            ))))),
        }
    }
}

impl PlaylistEditor for MemoryService {
    fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<TrackObject>, ServiceError> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self.recommended.iter().take(request.limit).cloned().collect())
    }

    fn create_playlist(&self, user_id: &str, name: &str) -> Result<String, ServiceError> {
        let mut created = self.created.borrow_mut();
        let id = format!("created{}", created.len() + 1);
        created.push(CreatedPlaylist {
            id: id.clone(),
            owner_id: user_id.to_string(),
            name: name.to_string(),
            uris: Vec::new(),
        });
        Ok(id)
    }

    fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ServiceError> {
        let mut created = self.created.borrow_mut();
        let playlist = created
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| ServiceError::NotFound(format!("playlist {}", playlist_id)))?;
        playlist.uris.extend(uris.iter().cloned());
        Ok(())
    }
}
