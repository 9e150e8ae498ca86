//! Identification endpoints: photo scan, manual text search, add-by-id
//!
//! All three run the same pipeline, persist the flattened record on
//! success, and answer 404 with the pipeline's message on a soft miss —
//! the contract the frontend expects.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::db::albums::{save_album, SavedAlbum};
use crate::error::{ApiError, ApiResult};
use crate::models::Identification;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct AddByIdRequest {
    pub discogs_id: u64,
}

/// POST /scan
///
/// Multipart photo upload → full identification pipeline.
pub async fn scan(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Identification>> {
    let mut photo: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        // Only the `file` field carries the photo; unrelated form fields
        // are skipped.
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        photo = Some((file_name, bytes.to_vec()));
        break;
    }

    let Some((file_name, bytes)) = photo else {
        return Err(ApiError::BadRequest("Missing file upload".to_string()));
    };

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Empty file".to_string()));
    }

    tracing::info!(
        file_name = file_name.as_deref().unwrap_or("<unnamed>"),
        size = bytes.len(),
        "Received photo for identification"
    );

    let result = state.identifier.identify_from_image(&bytes, file_name).await;
    persist_and_respond(&state, result).await
}

/// POST /search-manual
///
/// Free-text query → pipeline without the OCR step.
pub async fn search_manual(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<Identification>> {
    tracing::info!(query = %request.query, "Manual search");

    let result = state.identifier.identify_from_text(&request.query).await;
    persist_and_respond(&state, result).await
}

/// POST /add-by-id
///
/// User picked a specific candidate; fetch it by exact catalog id.
pub async fn add_by_id(
    State(state): State<AppState>,
    Json(request): Json<AddByIdRequest>,
) -> ApiResult<Json<Identification>> {
    tracing::info!(discogs_id = request.discogs_id, "Add by catalog id");

    let result = state
        .identifier
        .identify_from_catalog_id(request.discogs_id)
        .await;
    persist_and_respond(&state, result).await
}

/// Persist a successful identification and return it; a soft miss becomes
/// a 404 carrying the pipeline's message.
async fn persist_and_respond(
    state: &AppState,
    result: Identification,
) -> ApiResult<Json<Identification>> {
    match result {
        Identification::Success(record) => {
            let album = SavedAlbum::from_record(&record);
            save_album(&state.db, &album).await?;
            tracing::info!(artist = %album.artist, title = %album.title, "Saved identified record");
            Ok(Json(Identification::Success(record)))
        }
        Identification::Error { message } => Err(ApiError::NotFound(message)),
    }
}

/// Build identification routes
pub fn identify_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan))
        .route("/search-manual", post(search_manual))
        .route("/add-by-id", post(add_by_id))
}
