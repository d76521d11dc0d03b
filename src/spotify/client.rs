//! Blocking HTTP client for the Spotify Web API
//!
//! Reads use an app token from the client-credentials flow. Playlist edits
//! need a user-authorized token supplied through [`Credentials`].

use super::error::ServiceError;
use super::{MusicService, Pages, PlaylistEditor};
use crate::config::{Credentials, ACCESS_TOKEN_VAR};
use crate::model::{PlaylistItem, PlaylistSummary, RecommendationRequest, Record, TrackObject};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::RETRY_AFTER;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PLAYLISTS_PAGE_SIZE: u32 = 50;
const TRACKS_PAGE_SIZE: u32 = 100;
/// Upper bound on URIs per add-items request
pub const ADD_TRACKS_CHUNK: usize = 100;

const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_WAIT: Duration = Duration::from_secs(60);
/// Refresh the app token this long before it actually expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct AppToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    tracks: Vec<TrackObject>,
}

#[derive(Deserialize)]
struct CreatedPlaylist {
    id: String,
}

pub struct SpotifyClient {
    http: Client,
    credentials: Credentials,
    app_token: Mutex<Option<AppToken>>,
}

impl SpotifyClient {
    pub fn new(credentials: &Credentials) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .user_agent(concat!("playlist-logger/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            credentials: credentials.clone(),
            app_token: Mutex::new(None),
        })
    }

    /// App token, fetched again once the cached one is about to expire
    fn app_token(&self) -> Result<String, ServiceError> {
        let mut cached = self
            .app_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        log::debug!("Requesting app access token");
        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Auth(format!(
                "token request failed with status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = decode(TOKEN_URL, &response.text()?)?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let value = token.access_token.clone();
        *cached = Some(AppToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        });

        Ok(value)
    }

    fn user_token(&self) -> Result<&str, ServiceError> {
        self.credentials
            .access_token
            .as_deref()
            .ok_or(ServiceError::MissingCredential(ACCESS_TOKEN_VAR))
    }

    /// Send a request, waiting out 429 responses, and return the body text
    fn send(
        &self,
        url: &str,
        build: impl Fn(&Client) -> RequestBuilder,
        token: &str,
    ) -> Result<String, ServiceError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let response = build(&self.http).bearer_auth(token).send()?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::from_secs(1))
                    .min(MAX_RETRY_WAIT);
                log::warn!(
                    "Rate limited on {} (attempt {}/{}), waiting {:?}",
                    url,
                    attempt,
                    MAX_ATTEMPTS,
                    wait
                );
                if attempt < MAX_ATTEMPTS {
                    std::thread::sleep(wait);
                }
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(ServiceError::Auth(format!("{} returned {}", url, status)));
            }
            if status == StatusCode::NOT_FOUND {
                return Err(ServiceError::NotFound(url.to_string()));
            }
            if !status.is_success() {
                return Err(ServiceError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            return Ok(response.text()?);
        }

        Err(ServiceError::RateLimited {
            url: url.to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        let token = self.app_token()?;
        let body = self.send(url, |http| http.get(url), &token)?;
        decode(url, &body)
    }

    fn pages<T: DeserializeOwned + 'static>(
        &self,
        first_url: Result<Url, ServiceError>,
    ) -> Pages<'_, T> {
        match first_url {
            Ok(url) => Box::new(PageIter {
                client: self,
                next_url: Some(url.into()),
                buffer: VecDeque::new(),
            }),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

/// Follows `next` links one page at a time
struct PageIter<'a, T> {
    client: &'a SpotifyClient,
    next_url: Option<String>,
    buffer: VecDeque<T>,
}

impl<T: DeserializeOwned> Iterator for PageIter<'_, T> {
    type Item = Result<T, ServiceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }

            let url = self.next_url.take()?;
            log::debug!("Fetching page {}", url);
            match self.client.get::<Page<T>>(&url) {
                Ok(page) => {
                    self.buffer.extend(page.items);
                    self.next_url = page.next;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// API URL from raw path segments, each percent-encoded, plus query pairs
fn api_url<K, V>(segments: &[&str], query: &[(K, V)]) -> Result<Url, ServiceError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(API_BASE).map_err(|e| ServiceError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ServiceError::InvalidUrl(API_BASE.to_string()))?
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body).map_err(|e| ServiceError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

impl MusicService for SpotifyClient {
    fn fetch_profile(&self, user_id: &str) -> Result<Record, ServiceError> {
        let url = api_url::<&str, &str>(&["users", user_id], &[])?;
        self.get(url.as_str())
    }

    fn fetch_playlists<'a>(&'a self, owner_id: &str) -> Pages<'a, PlaylistSummary> {
        self.pages(api_url(
            &["users", owner_id, "playlists"],
            &[("limit", PLAYLISTS_PAGE_SIZE.to_string())],
        ))
    }

    fn fetch_playlist_tracks<'a>(&'a self, playlist_id: &str) -> Pages<'a, PlaylistItem> {
        self.pages(api_url(
            &["playlists", playlist_id, "tracks"],
            &[("limit", TRACKS_PAGE_SIZE.to_string())],
        ))
    }
}

impl PlaylistEditor for SpotifyClient {
    fn recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<TrackObject>, ServiceError> {
        let url = api_url(&["recommendations"], &request.query_pairs())?;
        let response: RecommendationsResponse = self.get(url.as_str())?;
        Ok(response.tracks)
    }

    fn create_playlist(&self, user_id: &str, name: &str) -> Result<String, ServiceError> {
        let token = self.user_token()?;
        let url = api_url::<&str, &str>(&["users", user_id, "playlists"], &[])?;
        let body = json!({ "name": name });
        let response =
            self.send(url.as_str(), |http| http.post(url.clone()).json(&body), token)?;
        let created: CreatedPlaylist = decode(url.as_str(), &response)?;
        Ok(created.id)
    }

    fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ServiceError> {
        let token = self.user_token()?;
        let url = api_url::<&str, &str>(&["playlists", playlist_id, "tracks"], &[])?;
        for chunk in uris.chunks(ADD_TRACKS_CHUNK) {
            let body = json!({ "uris": chunk });
            self.send(url.as_str(), |http| http.post(url.clone()).json(&body), token)?;
        }
        Ok(())
    }
}
