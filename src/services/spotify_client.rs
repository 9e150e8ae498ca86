//! Spotify API client (streaming linker)
//!
//! Resolves an artist + album title to a playable deep link and a
//! high-resolution cover. Queries use Spotify's field qualifiers
//! (`artist:… album:…`) rather than a bag of words, and request exactly
//! one result.
//!
//! The client-credentials bearer token is cached behind a mutex and
//! refreshed shortly before expiry. Without credentials the client is
//! permanently disabled and every lookup is a miss.

use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::StreamingLink;
use crate::types::{Lookup, StreamingProvider};

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SPOTIFY_SEARCH_URL: &str = "https://api.spotify.com/v1/search";
const USER_AGENT: &str = "waxid/0.1.0";
/// Refresh the cached token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;

/// Spotify client errors
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    albums: AlbumPage,
}

#[derive(Debug, Deserialize)]
struct AlbumPage {
    #[serde(default)]
    items: Vec<AlbumItem>,
}

#[derive(Debug, Deserialize)]
struct AlbumItem {
    uri: String,
    external_urls: ExternalUrls,
    /// Size-ordered, largest first.
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: String,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    credentials: Option<(String, String)>,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    /// Both id and secret are required to enable the client; anything less
    /// builds a permanently disabled one.
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Self, SpotifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SpotifyError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            credentials: client_id.zip(client_secret),
            token: Mutex::new(None),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Get a valid bearer token, refreshing via the client-credentials
    /// grant when the cached one is missing or near expiry.
    async fn bearer_token(&self) -> Result<String, SpotifyError> {
        let (client_id, client_secret) = self
            .credentials
            .as_ref()
            .ok_or_else(|| SpotifyError::AuthFailed("no credentials configured".to_string()))?;

        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!("Requesting Spotify access token");

        let response = self
            .http_client
            .post(SPOTIFY_TOKEN_URL)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SpotifyError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpotifyError::AuthFailed(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SpotifyError::ParseError(e.to_string()))?;

        let lifetime = token
            .expires_in
            .saturating_sub(TOKEN_EXPIRY_MARGIN_SECS)
            .max(1);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(token.access_token)
    }

    async fn search_album(
        &self,
        artist: &str,
        album_title: &str,
    ) -> Result<Option<AlbumItem>, SpotifyError> {
        let token = self.bearer_token().await?;
        let query = build_album_query(artist, album_title);

        tracing::debug!(query = %query, "Querying Spotify album search");

        let response = self
            .http_client
            .get(SPOTIFY_SEARCH_URL)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("type", "album"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| SpotifyError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpotifyError::ApiError(status.as_u16(), error_text));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| SpotifyError::ParseError(e.to_string()))?;

        Ok(search.albums.items.into_iter().next())
    }
}

#[async_trait::async_trait]
impl StreamingProvider for SpotifyClient {
    async fn find_album(&self, artist: &str, album_title: &str) -> Lookup<StreamingLink> {
        if !self.is_enabled() {
            tracing::debug!("Streaming linker disabled: no Spotify credentials configured");
            return Lookup::Miss;
        }

        match self.search_album(artist, album_title).await {
            Ok(Some(album)) => {
                let link = StreamingLink {
                    url: album.external_urls.spotify,
                    uri: album.uri,
                    // Largest image first; some releases have none.
                    cover: album.images.into_iter().next().map(|i| i.url),
                };
                tracing::info!(provider = "spotify", url = %link.url, "Found streaming match");
                Lookup::Hit(link)
            }
            Ok(None) => {
                tracing::info!(provider = "spotify", artist = %artist, album = %album_title, "No streaming match");
                Lookup::Miss
            }
            Err(e) => {
                tracing::warn!(provider = "spotify", artist = %artist, album = %album_title, "Streaming lookup failed: {}", e);
                Lookup::Fault(e.to_string())
            }
        }
    }
}

/// Field-qualified album query.
fn build_album_query(artist: &str, album_title: &str) -> String {
    format!("artist:{} album:{}", artist, album_title)
}
