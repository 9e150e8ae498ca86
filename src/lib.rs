//! waxid library interface
//!
//! Identifies a vinyl record from a sleeve photo or a free-text query:
//! OCR → discography catalog → streaming link, persisting successful
//! identifications into a SQLite library. Provider clients are injected
//! into the orchestrator as trait objects so the HTTP layer and tests
//! share the same pipeline.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::Identifier;

/// Upload cap for sleeve photos. Phone photos commonly run 2-8 MB, well
/// past axum's 2 MB default body limit.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Library database connection pool
    pub db: SqlitePool,
    /// Identification pipeline with injected provider clients
    pub identifier: Arc<Identifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, identifier: Arc<Identifier>) -> Self {
        Self {
            db,
            identifier,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Permissive CORS matches the original deployment: the frontend is
/// served from a different origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::identify_routes())
        .merge(api::candidate_routes())
        .merge(api::library_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
