//! Candidate disambiguation endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::models::Candidate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CandidateRequest {
    pub query: String,
}

/// POST /search-candidates
///
/// Returns up to ten loosely-matched releases for the user to pick from.
/// Always 200: a catalog fault degrades to an empty list.
pub async fn search_candidates(
    State(state): State<AppState>,
    Json(request): Json<CandidateRequest>,
) -> Json<Vec<Candidate>> {
    tracing::info!(query = %request.query, "Candidate search");

    let candidates = state.identifier.candidates(&request.query).await;
    Json(candidates)
}

/// Build candidate search routes
pub fn candidate_routes() -> Router<AppState> {
    Router::new().route("/search-candidates", post(search_candidates))
}
