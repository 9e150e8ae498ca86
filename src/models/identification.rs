//! The composed identification output contract
//!
//! All three pipeline entry points converge on [`Identification`], the exact
//! JSON shape the frontend and the storage boundary consume:
//! `{"status":"success","display":{…},"details":{…},"links":{…}}` or
//! `{"status":"error","message":…}`.

use serde::{Deserialize, Serialize};

use crate::models::ReleaseMatch;

/// Streaming-service enrichment for a matched release.
///
/// A miss is represented as absence at the call site, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingLink {
    /// Public deep link to the album.
    pub url: String,
    /// Provider URI identifier (e.g. `spotify:album:…`).
    pub uri: String,
    /// Largest cover image URL; some releases lack artwork.
    pub cover: Option<String>,
}

/// Final pipeline outcome, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Identification {
    Success(IdentifiedRecord),
    Error { message: String },
}

impl Identification {
    pub fn error(message: impl Into<String>) -> Self {
        Identification::Error {
            message: message.into(),
        }
    }
}

/// A successfully identified record, grouped for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedRecord {
    pub display: Display,
    pub details: Details,
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub artist: String,
    pub title: String,
    /// Cover preference: streaming high-resolution cover when present,
    /// else the catalog cover, else null.
    pub cover_image: Option<String>,
    /// Reference to the uploaded photo; null for text and catalog-id
    /// entry points.
    pub original_photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub year: String,
    pub label: String,
    pub genre: Vec<String>,
    pub tracklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Links {
    pub spotify_url: Option<String>,
    pub spotify_uri: Option<String>,
    pub discogs_url: String,
}

impl IdentifiedRecord {
    /// Compose the final record from a catalog match and optional
    /// streaming enrichment.
    pub fn compose(
        release: ReleaseMatch,
        streaming: Option<StreamingLink>,
        original_photo: Option<String>,
    ) -> Self {
        let mut cover_image = release.cover;
        let mut spotify_url = None;
        let mut spotify_uri = None;

        if let Some(link) = streaming {
            spotify_url = Some(link.url);
            spotify_uri = Some(link.uri);
            if link.cover.is_some() {
                cover_image = link.cover;
            }
        }

        IdentifiedRecord {
            display: Display {
                artist: release.artist,
                title: release.title,
                cover_image,
                original_photo,
            },
            details: Details {
                year: release.year,
                label: release.label,
                genre: release.genres,
                tracklist: release.tracklist,
            },
            links: Links {
                spotify_url,
                spotify_uri,
                discogs_url: release.url,
            },
        }
    }
}
