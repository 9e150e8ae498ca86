//! Identification orchestrator
//!
//! Composes the text extractor, catalog resolver and streaming linker into
//! one sequential pipeline with three entry points (photo, free text,
//! catalog id) that all converge on the same [`Identification`] shape.
//! Each entry point is terminal after one pass: no retries, no loops, one
//! attempt per provider.

use std::sync::Arc;

use crate::models::{Candidate, Identification, IdentifiedRecord, ReleaseMatch, StreamingLink};
use crate::types::{CatalogProvider, Lookup, OcrProvider, StreamingProvider};

/// Soft-miss message when OCR finds nothing usable on the photo.
pub const MSG_UNREADABLE: &str = "Unreadable text on photo";
/// Soft-miss message when the catalog has no release for the query.
pub const MSG_NOT_FOUND: &str = "Release not found in catalog for this text";

/// The identification pipeline with its injected provider collaborators.
///
/// Holds no mutable state; concurrent requests run independent passes over
/// the same shared clients.
pub struct Identifier {
    ocr: Arc<dyn OcrProvider>,
    catalog: Arc<dyn CatalogProvider>,
    streaming: Arc<dyn StreamingProvider>,
}

impl Identifier {
    pub fn new(
        ocr: Arc<dyn OcrProvider>,
        catalog: Arc<dyn CatalogProvider>,
        streaming: Arc<dyn StreamingProvider>,
    ) -> Self {
        Self {
            ocr,
            catalog,
            streaming,
        }
    }

    /// Identify a record from a photo of its sleeve.
    ///
    /// OCR → catalog → streaming, strictly in sequence. The catalog is
    /// never consulted when OCR produced nothing.
    pub async fn identify_from_image(
        &self,
        image: &[u8],
        photo_reference: Option<String>,
    ) -> Identification {
        let text = match self.ocr.extract_text(image).await {
            Lookup::Hit(text) => text,
            Lookup::Miss => return Identification::error(MSG_UNREADABLE),
            Lookup::Fault(e) => {
                // Fault already logged by the extractor; the user outcome
                // is the same soft miss.
                tracing::info!("OCR fault degraded to unreadable-photo miss: {}", e);
                return Identification::error(MSG_UNREADABLE);
            }
        };

        self.resolve_and_compose(&text, photo_reference).await
    }

    /// Identify a record from a user-supplied text query.
    pub async fn identify_from_text(&self, query: &str) -> Identification {
        self.resolve_and_compose(query, None).await
    }

    /// Identify a record the user already picked from a candidate list.
    ///
    /// Unlike the search path, a catalog fault here surfaces its message:
    /// the user asked for one specific release and deserves to know why it
    /// could not be fetched.
    pub async fn identify_from_catalog_id(&self, id: u64) -> Identification {
        match self.catalog.release_by_id(id).await {
            Lookup::Hit(release) => {
                let streaming = self.enrich(&release).await;
                Identification::Success(IdentifiedRecord::compose(release, streaming, None))
            }
            Lookup::Miss => Identification::error(MSG_NOT_FOUND),
            Lookup::Fault(message) => Identification::Error { message },
        }
    }

    /// Disambiguation search; degrades to an empty list on catalog faults.
    pub async fn candidates(&self, query: &str) -> Vec<Candidate> {
        self.catalog.find_candidates(query).await
    }

    async fn resolve_and_compose(
        &self,
        query: &str,
        photo_reference: Option<String>,
    ) -> Identification {
        let release = match self.catalog.find_release(query).await {
            Lookup::Hit(release) => release,
            Lookup::Miss => return Identification::error(MSG_NOT_FOUND),
            Lookup::Fault(e) => {
                tracing::info!(query = %query, "Catalog fault degraded to not-found miss: {}", e);
                return Identification::error(MSG_NOT_FOUND);
            }
        };

        let streaming = self.enrich(&release).await;
        Identification::Success(IdentifiedRecord::compose(
            release,
            streaming,
            photo_reference,
        ))
    }

    /// Best-effort streaming enrichment; never fails the pipeline.
    async fn enrich(&self, release: &ReleaseMatch) -> Option<StreamingLink> {
        match self
            .streaming
            .find_album(&release.artist, &release.title)
            .await
        {
            Lookup::Hit(link) => Some(link),
            Lookup::Miss => None,
            Lookup::Fault(e) => {
                tracing::info!(
                    artist = %release.artist,
                    title = %release.title,
                    "Streaming fault degraded to no enrichment: {}",
                    e
                );
                None
            }
        }
    }
}
