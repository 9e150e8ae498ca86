//! Saved library endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::db::albums;
use crate::db::albums::SavedAlbum;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /library
///
/// All saved records, most recently saved first.
pub async fn get_library(State(state): State<AppState>) -> ApiResult<Json<Vec<SavedAlbum>>> {
    let albums = albums::list_albums(&state.db).await?;
    Ok(Json(albums))
}

/// DELETE /album/:id
pub async fn delete_album(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = albums::delete_album(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound(format!("Album {} not found", id)));
    }

    tracing::info!(album_id = %id, "Deleted album from library");
    Ok(Json(json!({ "message": "Album deleted" })))
}

/// Build library routes
pub fn library_routes() -> Router<AppState> {
    Router::new()
        .route("/library", get(get_library))
        .route("/album/:id", delete(delete_album))
}
