//! waxid - Vinyl Record Identification Service
//!
//! Scans a photo of a record sleeve (or takes a text query), resolves it
//! against the Discogs catalog, enriches it with a Spotify link and
//! high-resolution cover, and saves the result into a SQLite library.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use waxid::config::Config;
use waxid::services::{DiscogsClient, Identifier, SpotifyClient, VisionClient};
use waxid::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting waxid (vinyl identification service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    // Provider clients are constructed once and injected into the
    // pipeline; a missing credential disables that provider, never the
    // whole service.
    if config.vision_api_key.is_none() {
        warn!("No Vision API key configured. OCR disabled; photo scans will fail as unreadable.");
    }
    if config.discogs_token.is_none() {
        warn!("No Discogs token configured. Catalog requests will be unauthenticated.");
    }
    if config.spotify_client_id.is_none() || config.spotify_client_secret.is_none() {
        warn!("Spotify credentials incomplete. Streaming links disabled.");
    }

    let vision = VisionClient::new(config.vision_api_key.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create Vision client: {}", e))?;
    let discogs = DiscogsClient::new(config.discogs_token.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create Discogs client: {}", e))?;
    let spotify = SpotifyClient::new(
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create Spotify client: {}", e))?;

    let identifier = Arc::new(Identifier::new(
        Arc::new(vision),
        Arc::new(discogs),
        Arc::new(spotify),
    ));

    info!("Database: {}", config.database.display());
    let db_pool = waxid::db::init_database_pool(&config.database).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool, identifier);
    let app = waxid::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
