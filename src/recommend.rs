//! Recommendation playlists
//!
//! Builds a new playlist from tracks recommended for the tail of an
//! existing one, optionally steered by artist and genre seeds and
//! audio-feature targets.

use crate::model::{RecommendationRequest, MAX_SEEDS};
use crate::spotify::PlaylistEditor;
use anyhow::{Context, Result};

/// Create `new_name` for `user_id`, filled with tracks recommended for
/// `request` plus the last tracks of `source_playlist_id`.
///
/// The playlist fills whatever seed slots the request's artists and genres
/// leave free. Returns the new playlist id.
pub fn create_recommended_playlist<E: PlaylistEditor>(
    editor: &E,
    source_playlist_id: &str,
    new_name: &str,
    user_id: &str,
    request: RecommendationRequest,
) -> Result<String> {
    let free_slots = MAX_SEEDS.saturating_sub(request.seed_count());
    let seeds = seed_tracks(editor, source_playlist_id, free_slots)?;
    log::info!("Seeding recommendations with {} track(s)", seeds.len());

    let mut tracks = request.seed_tracks.clone();
    tracks.extend(seeds);
    let request = request.with_tracks(tracks);
    request
        .validate()
        .with_context(|| format!("Cannot seed recommendations from {}", source_playlist_id))?;

    let recommended = editor
        .recommendations(&request)
        .context("Failed to fetch recommendations")?;
    let uris: Vec<String> = recommended.into_iter().filter_map(|t| t.uri).collect();

    let playlist_id = editor
        .create_playlist(user_id, new_name)
        .with_context(|| format!("Failed to create playlist {:?}", new_name))?;
    editor
        .add_tracks(&playlist_id, &uris)
        .with_context(|| format!("Failed to add tracks to playlist {}", playlist_id))?;

    log::info!(
        "Created playlist {:?} ({}) with {} track(s)",
        new_name,
        playlist_id,
        uris.len()
    );
    Ok(playlist_id)
}

/// Ids of the last `count` tracks that have one, in playlist order
fn seed_tracks<E: PlaylistEditor>(
    editor: &E,
    playlist_id: &str,
    count: usize,
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for item in editor.fetch_playlist_tracks(playlist_id) {
        let item = item
            .with_context(|| format!("Failed to fetch tracks of playlist {}", playlist_id))?;
        if let Some(id) = item.track.and_then(|t| t.id) {
            ids.push(id);
        }
    }

    let start = ids.len().saturating_sub(count);
    Ok(ids.split_off(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlaylistItem, PlaylistSummary, TrackObject};
    use crate::spotify::MemoryService;

    fn track(n: usize) -> TrackObject {
        TrackObject {
            id: Some(format!("t{}", n)),
            name: format!("Song {}", n),
            uri: Some(format!("spotify:track:t{}", n)),
            artists: Vec::new(),
        }
    }

    fn service_with(tracks: usize) -> MemoryService {
        let mut service = MemoryService::new();
        let items = (0..tracks)
            .map(|n| PlaylistItem {
                track: Some(track(n)),
                ..Default::default()
            })
            .collect();
        service.add_playlist(
            "u1",
            PlaylistSummary {
                id: "src".to_string(),
                name: "Source".to_string(),
                ..Default::default()
            },
            items,
        );
        service.set_recommendations((100..110).map(track).collect());
        service
    }

    #[test]
    fn test_uses_last_five_tracks() {
        let service = service_with(8);
        let seeds = seed_tracks(&service, "src", MAX_SEEDS).unwrap();
        assert_eq!(seeds, vec!["t3", "t4", "t5", "t6", "t7"]);
    }

    #[test]
    fn test_short_playlist_uses_all_tracks() {
        let service = service_with(2);
        assert_eq!(seed_tracks(&service, "src", MAX_SEEDS).unwrap(), vec!["t0", "t1"]);
    }

    #[test]
    fn test_creates_playlist_with_recommendations() {
        let service = service_with(6);

        let id = create_recommended_playlist(
            &service,
            "src",
            "Suggestions",
            "u1",
            RecommendationRequest::new(3),
        )
        .unwrap();

        let created = service.created_playlists();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, id);
        assert_eq!(created[0].owner_id, "u1");
        assert_eq!(created[0].name, "Suggestions");
        assert_eq!(
            created[0].uris,
            vec!["spotify:track:t100", "spotify:track:t101", "spotify:track:t102"]
        );
        assert_eq!(
            service.recommendation_requests()[0].seed_tracks,
            vec!["t1", "t2", "t3", "t4", "t5"]
        );
    }

    #[test]
    fn test_genre_and_artist_seeds_take_track_slots() {
        let service = service_with(6);
        let request = RecommendationRequest::new(2)
            .with_genres(vec!["jazz".to_string(), "soul".to_string()])
            .with_artists(vec!["a1".to_string()])
            .with_target("energy", 0.8);

        create_recommended_playlist(&service, "src", "Mood", "u1", request).unwrap();

        let sent = &service.recommendation_requests()[0];
        assert_eq!(sent.seed_tracks, vec!["t4", "t5"]);
        assert_eq!(sent.seed_genres, vec!["jazz", "soul"]);
        assert_eq!(sent.seed_artists, vec!["a1"]);
        assert_eq!(sent.targets, vec![("energy".to_string(), 0.8)]);
        assert_eq!(sent.seed_count(), MAX_SEEDS);
    }

    #[test]
    fn test_empty_source_without_other_seeds_fails() {
        let service = service_with(0);
        let result =
            create_recommended_playlist(&service, "src", "X", "u1", RecommendationRequest::new(3));
        assert!(result.is_err());
        assert!(service.created_playlists().is_empty());
    }

    #[test]
    fn test_empty_source_with_genre_seed_succeeds() {
        let service = service_with(0);
        let request = RecommendationRequest::new(1).with_genres(vec!["house".to_string()]);

        create_recommended_playlist(&service, "src", "X", "u1", request).unwrap();

        assert_eq!(service.created_playlists()[0].uris, vec!["spotify:track:t100"]);
    }

    #[test]
    fn test_unknown_genre_fails_before_creating() {
        let service = service_with(3);
        let request = RecommendationRequest::new(1).with_genres(vec!["not-a-genre".to_string()]);

        assert!(create_recommended_playlist(&service, "src", "X", "u1", request).is_err());
        assert!(service.created_playlists().is_empty());
    }
}
