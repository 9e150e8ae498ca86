//! Catalog-side models: the single best-match release and the
//! disambiguation candidate list

use serde::{Deserialize, Serialize};

/// Sentinel used when a release credits no artist.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Sentinel used when a release lists no label.
pub const UNKNOWN_LABEL: &str = "Unknown Label";
/// Sentinel used when a release carries no year.
pub const UNKNOWN_YEAR: &str = "Unknown Year";
/// Sentinel used when a candidate's artist cannot be resolved.
pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// Maximum number of candidates returned by a disambiguation search.
pub const CANDIDATE_LIMIT: usize = 10;

/// The single best release resolved from the catalog for a query.
///
/// `artist` and `title` are always non-empty; every other field may hold a
/// sentinel or be empty when the catalog record is incomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMatch {
    /// Comma-joined names of all credited artists, or [`UNKNOWN_ARTIST`].
    pub artist: String,
    /// Release title.
    pub title: String,
    /// Stringified release year, or [`UNKNOWN_YEAR`].
    pub year: String,
    /// Name of the first listed label, or [`UNKNOWN_LABEL`].
    pub label: String,
    /// Catalog genre list, verbatim order.
    pub genres: Vec<String>,
    /// Titles of position-marked tracklist entries, original order.
    /// Side markers and medley headers carry no position and are dropped.
    pub tracklist: Vec<String>,
    /// Catalog page URL for the release.
    pub url: String,
    /// URI of the first catalog image, if any.
    pub cover: Option<String>,
    /// Numeric catalog id.
    pub id: u64,
}

/// A loosely-matched release surfaced for user disambiguation.
///
/// Partially trusted: every candidate has a non-empty title (untitled items
/// are skipped at the source); all other fields fall back to a sentinel or
/// an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Numeric catalog id.
    pub discogs_id: u64,
    /// Item title (often "Artist - Album" in catalog search results).
    pub title: String,
    /// First credited artist, or [`VARIOUS_ARTISTS`].
    pub artist: String,
    /// Stringified year, or empty.
    pub year: String,
    /// First label name, or empty.
    pub label: String,
    /// Thumbnail URL, or empty.
    pub thumb: String,
}
