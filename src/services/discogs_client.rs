//! Discogs API client (catalog resolver + candidate search)
//!
//! Two lookup styles against the same catalog:
//!
//! - **Resolve**: release-type search with the query string unmodified,
//!   strictly the first result, then a full release fetch for the complete
//!   field set. No scoring or secondary ranking.
//! - **Candidates**: unfiltered (all-types) search surfacing up to
//!   [`CANDIDATE_LIMIT`] loosely-filtered items for user disambiguation,
//!   with per-item fault isolation.
//!
//! The adapter DTOs in this module are the single place raw Discogs JSON is
//! translated into present-or-absent fields; nothing downstream probes
//! attributes ad hoc.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    Candidate, ReleaseMatch, CANDIDATE_LIMIT, UNKNOWN_ARTIST, UNKNOWN_LABEL, UNKNOWN_YEAR,
    VARIOUS_ARTISTS,
};
use crate::types::{CatalogProvider, Lookup};

const DISCOGS_BASE_URL: &str = "https://api.discogs.com";
const USER_AGENT: &str = "waxid/0.1.0";

/// Discogs client errors
#[derive(Debug, Error)]
pub enum DiscogsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Release {0} not found in catalog")]
    ReleaseNotFound(u64),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

// ============================================================================
// Adapter DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Kept as raw values so one malformed item cannot fail the whole page.
    #[serde(default)]
    results: Vec<Value>,
}

/// One item of a catalog search page. Search results are shallow: artist
/// credits and images are usually absent, `label` is a plain string list
/// and `year` arrives as either a number or a string.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<YearField>,
    #[serde(default)]
    pub label: Option<Vec<String>>,
    #[serde(default)]
    pub artists: Option<Vec<NameRef>>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ImageRef>>,
}

/// Full release resource, the authoritative field source for a match.
#[derive(Debug, Deserialize)]
pub(crate) struct Release {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub artists: Option<Vec<NameRef>>,
    #[serde(default)]
    pub labels: Option<Vec<NameRef>>,
    #[serde(default)]
    pub images: Option<Vec<ImageRef>>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub year: Option<YearField>,
    #[serde(default)]
    pub tracklist: Option<Vec<Track>>,
    /// Public release page URL.
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NameRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageRef {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Track {
    /// Empty or absent for non-track entries (side markers, headings).
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Search and release payloads disagree on the year type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum YearField {
    Number(u64),
    Text(String),
}

impl YearField {
    fn as_string(&self) -> String {
        match self {
            YearField::Number(n) => n.to_string(),
            YearField::Text(s) => s.clone(),
        }
    }
}

// ============================================================================
// Field extraction
// ============================================================================

/// Flatten a full release resource into a [`ReleaseMatch`].
fn release_to_match(release: Release) -> ReleaseMatch {
    let artist = match release.artists.as_deref() {
        Some(artists) if !artists.is_empty() => artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => UNKNOWN_ARTIST.to_string(),
    };

    let label = release
        .labels
        .as_deref()
        .and_then(|labels| labels.first())
        .map(|l| l.name.clone())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string());

    let cover = release
        .images
        .as_deref()
        .and_then(|images| images.first())
        .and_then(|image| image.uri.clone());

    // Entries without a position marker are side/medley headers, not tracks.
    let tracklist = release
        .tracklist
        .unwrap_or_default()
        .into_iter()
        .filter(|t| t.position.as_deref().is_some_and(|p| !p.is_empty()))
        .filter_map(|t| t.title)
        .collect();

    let year = release
        .year
        .map(|y| y.as_string())
        .filter(|y| !y.is_empty() && y != "0")
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string());

    let url = release
        .uri
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("https://www.discogs.com/release/{}", release.id));

    ReleaseMatch {
        artist,
        title: release.title,
        year,
        label,
        genres: release.genres.unwrap_or_default(),
        tracklist,
        url,
        cover,
        id: release.id,
    }
}

/// Extract one candidate from a search item; `None` for untitled items
/// (artists and labels in an unfiltered search carry no title).
fn candidate_from_item(item: SearchItem) -> Option<Candidate> {
    let title = item.title.filter(|t| !t.is_empty())?;

    let artist = item
        .artists
        .as_deref()
        .and_then(|artists| artists.first())
        .map(|a| a.name.clone())
        .unwrap_or_else(|| VARIOUS_ARTISTS.to_string());

    let year = item.year.map(|y| y.as_string()).unwrap_or_default();

    let label = item
        .label
        .as_deref()
        .and_then(|labels| labels.first())
        .cloned()
        .unwrap_or_default();

    let thumb = item
        .thumb
        .filter(|t| !t.is_empty())
        .or_else(|| {
            item.images
                .as_deref()
                .and_then(|images| images.first())
                .and_then(|image| image.uri.clone())
        })
        .unwrap_or_default();

    Some(Candidate {
        discogs_id: item.id,
        title,
        artist,
        year,
        label,
        thumb,
    })
}

/// Scan raw search items in provider order, collecting accepted candidates
/// up to [`CANDIDATE_LIMIT`]. A malformed item is skipped with a warning;
/// it never aborts the scan.
fn collect_candidates(items: Vec<Value>) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for item in items {
        if candidates.len() >= CANDIDATE_LIMIT {
            break;
        }

        match serde_json::from_value::<SearchItem>(item) {
            Ok(item) => {
                if let Some(candidate) = candidate_from_item(item) {
                    candidates.push(candidate);
                }
            }
            Err(e) => {
                tracing::warn!(provider = "discogs", "Skipping malformed search item: {}", e);
            }
        }
    }

    candidates
}

// ============================================================================
// Client
// ============================================================================

/// Discogs API client
pub struct DiscogsClient {
    http_client: reqwest::Client,
    token: Option<String>,
}

impl DiscogsClient {
    /// Without a token, requests go out unauthenticated (the catalog
    /// rejects most of them; the resulting faults degrade per call site).
    pub fn new(token: Option<String>) -> Result<Self, DiscogsError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DiscogsError::NetworkError(e.to_string()))?;

        Ok(Self { http_client, token })
    }

    /// Issue a database search. `type_filter: None` is the deliberately
    /// broad all-types search used by candidate lookup.
    async fn search(
        &self,
        query: &str,
        type_filter: Option<&str>,
    ) -> Result<Vec<Value>, DiscogsError> {
        let url = format!("{}/database/search", DISCOGS_BASE_URL);

        let mut params: Vec<(&str, &str)> = vec![("q", query)];
        if let Some(type_filter) = type_filter {
            params.push(("type", type_filter));
        }
        if let Some(token) = self.token.as_deref() {
            params.push(("token", token));
        }

        tracing::debug!(query = %query, type_filter = ?type_filter, "Querying Discogs search");

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DiscogsError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DiscogsError::ApiError(status.as_u16(), error_text));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| DiscogsError::ParseError(e.to_string()))?;

        Ok(search.results)
    }

    /// Fetch the full release resource by catalog id.
    async fn get_release(&self, id: u64) -> Result<Release, DiscogsError> {
        let url = format!("{}/releases/{}", DISCOGS_BASE_URL, id);

        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(token) = self.token.as_deref() {
            params.push(("token", token));
        }

        tracing::debug!(release_id = id, "Fetching Discogs release");

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DiscogsError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(DiscogsError::ReleaseNotFound(id));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DiscogsError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| DiscogsError::ParseError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for DiscogsClient {
    async fn find_release(&self, query: &str) -> Lookup<ReleaseMatch> {
        let results = match self.search(query, Some("release")).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(provider = "discogs", query = %query, "Release search failed: {}", e);
                return Lookup::Fault(e.to_string());
            }
        };

        // First result wins; search items are shallow, so the full release
        // is fetched for field extraction.
        let Some(first) = results.into_iter().next() else {
            tracing::info!(provider = "discogs", query = %query, "No release found");
            return Lookup::Miss;
        };

        let item: SearchItem = match serde_json::from_value(first) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(provider = "discogs", query = %query, "Malformed search result: {}", e);
                return Lookup::Fault(e.to_string());
            }
        };

        match self.get_release(item.id).await {
            Ok(release) => {
                let release = release_to_match(release);
                tracing::info!(
                    provider = "discogs",
                    release_id = release.id,
                    artist = %release.artist,
                    title = %release.title,
                    "Resolved release"
                );
                Lookup::Hit(release)
            }
            Err(e) => {
                tracing::warn!(provider = "discogs", release_id = item.id, "Release fetch failed: {}", e);
                Lookup::Fault(e.to_string())
            }
        }
    }

    async fn release_by_id(&self, id: u64) -> Lookup<ReleaseMatch> {
        match self.get_release(id).await {
            Ok(release) => Lookup::Hit(release_to_match(release)),
            Err(e) => {
                tracing::warn!(provider = "discogs", release_id = id, "Release lookup failed: {}", e);
                Lookup::Fault(e.to_string())
            }
        }
    }

    async fn find_candidates(&self, query: &str) -> Vec<Candidate> {
        // All-types search: broader than the single-best-match path, so a
        // bare artist name still surfaces that artist's releases.
        match self.search(query, None).await {
            Ok(results) => {
                let examined = results.len();
                let candidates = collect_candidates(results);
                tracing::info!(
                    provider = "discogs",
                    query = %query,
                    accepted = candidates.len(),
                    examined,
                    "Candidate search complete"
                );
                candidates
            }
            Err(e) => {
                // Degrade to empty: a catalog outage must not break the
                // disambiguation UI.
                tracing::warn!(provider = "discogs", query = %query, "Candidate search failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_release_json() -> Value {
        json!({
            "id": 4742505,
            "title": "Krieg und Frieden (Music for Theatre)",
            "artists": [{"name": "Apparat"}],
            "labels": [{"name": "Mute"}, {"name": "Mute Artists"}],
            "images": [
                {"uri": "https://img.discogs.com/first.jpg"},
                {"uri": "https://img.discogs.com/second.jpg"}
            ],
            "genres": ["Electronic", "Stage & Screen"],
            "year": 2010,
            "uri": "https://www.discogs.com/release/4742505",
            "tracklist": [
                {"position": "A1", "title": "44"},
                {"position": "", "title": "Seite B", "type_": "heading"},
                {"position": "B1", "title": "K&F Thema"},
                {"title": "Untracked Medley"}
            ]
        })
    }

    #[test]
    fn test_release_extraction() {
        let release: Release = serde_json::from_value(full_release_json()).unwrap();
        let m = release_to_match(release);

        assert_eq!(m.artist, "Apparat");
        assert_eq!(m.title, "Krieg und Frieden (Music for Theatre)");
        assert_eq!(m.year, "2010");
        assert_eq!(m.label, "Mute");
        assert_eq!(m.genres, vec!["Electronic", "Stage & Screen"]);
        assert_eq!(m.cover.as_deref(), Some("https://img.discogs.com/first.jpg"));
        assert_eq!(m.url, "https://www.discogs.com/release/4742505");
    }

    #[test]
    fn test_tracklist_keeps_only_position_marked_entries() {
        let release: Release = serde_json::from_value(full_release_json()).unwrap();
        let m = release_to_match(release);

        // Heading and unpositioned entries dropped, order preserved.
        assert_eq!(m.tracklist, vec!["44", "K&F Thema"]);
    }

    #[test]
    fn test_release_extraction_sentinels() {
        let release: Release =
            serde_json::from_value(json!({"id": 99, "title": "White Label"})).unwrap();
        let m = release_to_match(release);

        assert_eq!(m.artist, UNKNOWN_ARTIST);
        assert_eq!(m.label, UNKNOWN_LABEL);
        assert_eq!(m.year, UNKNOWN_YEAR);
        assert_eq!(m.cover, None);
        assert!(m.genres.is_empty());
        assert!(m.tracklist.is_empty());
        assert_eq!(m.url, "https://www.discogs.com/release/99");
    }

    #[test]
    fn test_multiple_artists_comma_joined() {
        let release: Release = serde_json::from_value(json!({
            "id": 1,
            "title": "Promises",
            "artists": [
                {"name": "Floating Points"},
                {"name": "Pharoah Sanders"},
                {"name": "The London Symphony Orchestra"}
            ]
        }))
        .unwrap();

        assert_eq!(
            release_to_match(release).artist,
            "Floating Points, Pharoah Sanders, The London Symphony Orchestra"
        );
    }

    #[test]
    fn test_candidate_extraction() {
        let item: SearchItem = serde_json::from_value(json!({
            "id": 123,
            "title": "Apparat - Walls",
            "year": "2007",
            "label": ["Shitkatapult"],
            "thumb": "https://img.discogs.com/thumb.jpg"
        }))
        .unwrap();

        let c = candidate_from_item(item).unwrap();
        assert_eq!(c.discogs_id, 123);
        assert_eq!(c.title, "Apparat - Walls");
        assert_eq!(c.artist, VARIOUS_ARTISTS);
        assert_eq!(c.year, "2007");
        assert_eq!(c.label, "Shitkatapult");
        assert_eq!(c.thumb, "https://img.discogs.com/thumb.jpg");
    }

    #[test]
    fn test_candidate_thumb_falls_back_to_first_image() {
        let item: SearchItem = serde_json::from_value(json!({
            "id": 5,
            "title": "Some Album",
            "images": [{"uri": "https://img.discogs.com/img.jpg"}]
        }))
        .unwrap();

        let c = candidate_from_item(item).unwrap();
        assert_eq!(c.thumb, "https://img.discogs.com/img.jpg");
        assert_eq!(c.year, "");
        assert_eq!(c.label, "");
    }

    #[test]
    fn test_untitled_item_is_skipped() {
        let artist_item: SearchItem =
            serde_json::from_value(json!({"id": 45, "thumb": "x.jpg"})).unwrap();
        assert!(candidate_from_item(artist_item).is_none());

        let empty_title: SearchItem =
            serde_json::from_value(json!({"id": 46, "title": ""})).unwrap();
        assert!(candidate_from_item(empty_title).is_none());
    }

    #[test]
    fn test_collect_candidates_caps_and_filters() {
        // 15 items; item #7 (index 6) lacks a title, one item is malformed.
        let mut items: Vec<Value> = (0..15)
            .map(|i| json!({"id": i, "title": format!("Release {}", i)}))
            .collect();
        items[6] = json!({"id": 6, "thumb": "artist.jpg"});
        items[8] = json!({"id": "not-a-number", "title": "Broken"});

        let candidates = collect_candidates(items);

        assert_eq!(candidates.len(), CANDIDATE_LIMIT);
        assert!(candidates.iter().all(|c| c.discogs_id != 6));
        // Relative order of accepted items preserved.
        assert_eq!(candidates[0].title, "Release 0");
        assert_eq!(candidates[6].title, "Release 7");
        // Skips freed slots for later items.
        assert_eq!(candidates.last().unwrap().title, "Release 11");
    }

    #[test]
    fn test_collect_candidates_artist_item_first() {
        // An artist-type item (no title) followed by 12 releases: the list
        // holds 10 entries and starts at the first release item.
        let mut items = vec![json!({"id": 777, "thumb": "apparat.jpg"})];
        items.extend((0..12).map(|i| json!({"id": i, "title": format!("Album {}", i)})));

        let candidates = collect_candidates(items);

        assert_eq!(candidates.len(), CANDIDATE_LIMIT);
        assert_eq!(candidates[0].title, "Album 0");
    }

    #[test]
    fn test_year_field_number_and_text() {
        let numeric: SearchItem =
            serde_json::from_value(json!({"id": 1, "title": "A", "year": 1998})).unwrap();
        assert_eq!(candidate_from_item(numeric).unwrap().year, "1998");

        let text: SearchItem =
            serde_json::from_value(json!({"id": 2, "title": "B", "year": "1998"})).unwrap();
        assert_eq!(candidate_from_item(text).unwrap().year, "1998");
    }
}
