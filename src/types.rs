//! Core traits and outcome types for the identification pipeline
//!
//! Every external provider is modeled as a trait so the orchestrator receives
//! its collaborators by injection and tests can substitute doubles. Provider
//! calls return [`Lookup`] instead of raising: a soft miss is an ordinary
//! value, and a fault carries the provider's error text for logging.

use crate::models::{Candidate, ReleaseMatch, StreamingLink};

/// Outcome of a single provider lookup.
///
/// - `Hit` — the provider returned a usable result.
/// - `Miss` — the provider answered but found nothing (soft miss).
/// - `Fault` — network error, bad credentials, malformed response. The
///   component that produced it has already logged it; callers decide
///   whether a fault degrades to a miss or surfaces as a failure message.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Hit(T),
    Miss,
    Fault(String),
}

impl<T> Lookup<T> {
    /// Collapse to `Option`, treating a fault the same as a miss.
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Fault(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

/// OCR capability: raw image bytes to normalized text.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    /// Detect text on an image. `Miss` when no text regions were found or
    /// the provider is unconfigured; `Fault` on provider errors.
    async fn extract_text(&self, image: &[u8]) -> Lookup<String>;
}

/// Discography catalog capability: release search and direct lookup.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Best-match release search. Strictly the first result in
    /// provider-returned order; no scoring.
    async fn find_release(&self, query: &str) -> Lookup<ReleaseMatch>;

    /// Fetch a release by its exact catalog id.
    async fn release_by_id(&self, id: u64) -> Lookup<ReleaseMatch>;

    /// Loosely-filtered disambiguation list, capped at
    /// [`crate::models::CANDIDATE_LIMIT`]. Degrades to an empty list on
    /// provider faults.
    async fn find_candidates(&self, query: &str) -> Vec<Candidate>;
}

/// Streaming service capability: deep link + high-resolution cover.
#[async_trait::async_trait]
pub trait StreamingProvider: Send + Sync {
    /// Field-qualified album search, one result requested.
    async fn find_album(&self, artist: &str, album_title: &str) -> Lookup<StreamingLink>;
}
