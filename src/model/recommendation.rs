//! Recommendation queries

use anyhow::{bail, Result};

/// Most seeds (tracks, artists and genres combined) a single query accepts
pub const MAX_SEEDS: usize = 5;

/// Genres accepted as recommendation seeds
pub const SEED_GENRES: &[&str] = &[
    "acoustic", "afrobeat", "alt-rock", "alternative", "ambient", "anime", "black-metal",
    "bluegrass", "blues", "bossanova", "brazil", "breakbeat", "british", "cantopop",
    "chicago-house", "children", "chill", "classical", "club", "comedy", "country", "dance",
    "dancehall", "death-metal", "deep-house", "detroit-techno", "disco", "disney",
    "drum-and-bass", "dub", "dubstep", "edm", "electro", "electronic", "emo", "folk", "forro",
    "french", "funk", "garage", "german", "gospel", "goth", "grindcore", "groove", "grunge",
    "guitar", "happy", "hard-rock", "hardcore", "hardstyle", "heavy-metal", "hip-hop",
    "holidays", "honky-tonk", "house", "idm", "indian", "indie", "indie-pop", "industrial",
    "iranian", "j-dance", "j-idol", "j-pop", "j-rock", "jazz", "k-pop", "kids", "latin",
    "latino", "malay", "mandopop", "metal", "metal-misc", "metalcore", "minimal-techno",
    "movies", "mpb", "new-age", "new-release", "opera", "pagode", "party", "philippines-opm",
    "piano", "pop", "pop-film", "post-dubstep", "power-pop", "progressive-house", "psych-rock",
    "punk", "punk-rock", "r-n-b", "rainy-day", "reggae", "reggaeton", "road-trip", "rock",
    "rock-n-roll", "rockabilly", "romance", "sad", "salsa", "samba", "sertanejo", "show-tunes",
    "singer-songwriter", "ska", "sleep", "songwriter", "soul", "soundtracks", "spanish",
    "study", "summer", "swedish", "synth-pop", "tango", "techno", "trance", "trip-hop",
    "turkish", "work-out", "world-music",
];

/// Seeds, audio-feature targets and size of one recommendation query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationRequest {
    pub seed_tracks: Vec<String>,
    pub seed_artists: Vec<String>,
    pub seed_genres: Vec<String>,

    /// Audio-feature targets such as `("energy", 0.8)`, sent as `target_<feature>`
    pub targets: Vec<(String, f64)>,

    pub limit: usize,
}

impl RecommendationRequest {
    /// Request `limit` tracks with no seeds yet
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn with_tracks(mut self, tracks: Vec<String>) -> Self {
        self.seed_tracks = tracks;
        self
    }

    pub fn with_artists(mut self, artists: Vec<String>) -> Self {
        self.seed_artists = artists;
        self
    }

    pub fn with_genres(mut self, genres: Vec<String>) -> Self {
        self.seed_genres = genres;
        self
    }

    pub fn with_target(mut self, feature: impl Into<String>, value: f64) -> Self {
        self.targets.push((feature.into(), value));
        self
    }

    /// Total number of seeds of every kind
    pub fn seed_count(&self) -> usize {
        self.seed_tracks.len() + self.seed_artists.len() + self.seed_genres.len()
    }

    /// Check seed count and genre names
    pub fn validate(&self) -> Result<()> {
        let seeds = self.seed_count();
        if seeds == 0 {
            bail!("A recommendation query needs at least one seed");
        }
        if seeds > MAX_SEEDS {
            bail!("Too many seeds: {} (at most {})", seeds, MAX_SEEDS);
        }
        if let Some(genre) = self
            .seed_genres
            .iter()
            .find(|g| !SEED_GENRES.contains(&g.as_str()))
        {
            bail!("Unknown seed genre: {}", genre);
        }
        Ok(())
    }

    /// Query parameters in the Web API's form
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("limit".to_string(), self.limit.to_string())];
        for (name, seeds) in [
            ("seed_tracks", &self.seed_tracks),
            ("seed_artists", &self.seed_artists),
            ("seed_genres", &self.seed_genres),
        ] {
            if !seeds.is_empty() {
                pairs.push((name.to_string(), seeds.join(",")));
            }
        }
        for (feature, value) in &self.targets {
            pairs.push((format!("target_{}", feature), value.to_string()));
        }
        pairs
    }
}

/// Parse a `feature=value` target such as `energy=0.8`
pub fn parse_target(text: &str) -> Result<(String, f64)> {
    let Some((feature, value)) = text.split_once('=') else {
        bail!("Expected feature=value, got {:?}", text);
    };
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid target value in {:?}", text))?;
    Ok((feature.trim().to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let request = RecommendationRequest::new(20)
            .with_tracks(vec!["t1".to_string(), "t2".to_string()])
            .with_genres(vec!["jazz".to_string()])
            .with_target("energy", 0.8);

        assert_eq!(
            request.query_pairs(),
            vec![
                ("limit".to_string(), "20".to_string()),
                ("seed_tracks".to_string(), "t1,t2".to_string()),
                ("seed_genres".to_string(), "jazz".to_string()),
                ("target_energy".to_string(), "0.8".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_seed_limits() {
        assert!(RecommendationRequest::new(5).validate().is_err());

        let six: Vec<String> = (0..6).map(|n| format!("t{}", n)).collect();
        assert!(RecommendationRequest::new(5).with_tracks(six).validate().is_err());

        let ok = RecommendationRequest::new(5)
            .with_artists(vec!["a1".to_string()])
            .with_genres(vec!["k-pop".to_string()]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_genre() {
        let request = RecommendationRequest::new(5).with_genres(vec!["yacht-rock".to_string()]);
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("yacht-rock"));
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("danceability=0.7").unwrap(), ("danceability".to_string(), 0.7));
        assert!(parse_target("energy").is_err());
        assert!(parse_target("energy=high").is_err());
    }
}
