//! Configuration resolution for waxid
//!
//! Settings resolve with ENV → TOML priority. Every credential is optional:
//! a missing OCR key disables the text extractor, missing streaming
//! credentials disable the linker, and a missing catalog token downgrades
//! catalog requests to unauthenticated ones.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_BIND: &str = "127.0.0.1:5730";
const DEFAULT_DATABASE: &str = "waxid.db";

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address.
    pub bind: String,
    /// SQLite database path.
    pub database: PathBuf,
    /// Google Vision API key; `None` disables OCR permanently.
    pub vision_api_key: Option<String>,
    /// Discogs personal access token.
    pub discogs_token: Option<String>,
    /// Spotify client id; both id and secret are needed to enable linking.
    pub spotify_client_id: Option<String>,
    /// Spotify client secret.
    pub spotify_client_secret: Option<String>,
}

/// On-disk TOML configuration (all fields optional).
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    pub bind: Option<String>,
    pub database: Option<String>,
    pub vision_api_key: Option<String>,
    pub discogs_token: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
}

impl Config {
    /// Load configuration from the environment and the TOML file.
    ///
    /// File location: `WAXID_CONFIG` env var, else `waxid.toml` in the
    /// working directory. A missing file is not an error.
    pub fn load() -> Self {
        let toml_path = std::env::var("WAXID_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("waxid.toml"));
        let toml_config = read_toml_config(&toml_path);

        Self::from_sources(&EnvSource::capture(), &toml_config)
    }

    /// Merge an environment snapshot with a parsed TOML file.
    pub fn from_sources(env: &EnvSource, toml_config: &TomlConfig) -> Self {
        Config {
            bind: resolve_setting("bind", env.bind.clone(), toml_config.bind.clone())
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            database: resolve_setting(
                "database",
                env.database.clone(),
                toml_config.database.clone(),
            )
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            vision_api_key: resolve_setting(
                "vision_api_key",
                env.vision_api_key.clone(),
                toml_config.vision_api_key.clone(),
            ),
            discogs_token: resolve_setting(
                "discogs_token",
                env.discogs_token.clone(),
                toml_config.discogs_token.clone(),
            ),
            spotify_client_id: resolve_setting(
                "spotify_client_id",
                env.spotify_client_id.clone(),
                toml_config.spotify_client_id.clone(),
            ),
            spotify_client_secret: resolve_setting(
                "spotify_client_secret",
                env.spotify_client_secret.clone(),
                toml_config.spotify_client_secret.clone(),
            ),
        }
    }
}

/// Snapshot of the `WAXID_*` environment variables.
#[derive(Debug, Default, Clone)]
pub struct EnvSource {
    pub bind: Option<String>,
    pub database: Option<String>,
    pub vision_api_key: Option<String>,
    pub discogs_token: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
}

impl EnvSource {
    pub fn capture() -> Self {
        EnvSource {
            bind: std::env::var("WAXID_BIND").ok(),
            database: std::env::var("WAXID_DATABASE").ok(),
            vision_api_key: std::env::var("WAXID_VISION_API_KEY").ok(),
            discogs_token: std::env::var("WAXID_DISCOGS_TOKEN").ok(),
            spotify_client_id: std::env::var("WAXID_SPOTIFY_CLIENT_ID").ok(),
            spotify_client_secret: std::env::var("WAXID_SPOTIFY_CLIENT_SECRET").ok(),
        }
    }
}

/// Resolve one setting with ENV → TOML priority.
///
/// Warns when the value is present in both sources (potential
/// misconfiguration); blank values are treated as absent.
fn resolve_setting(name: &str, env: Option<String>, toml: Option<String>) -> Option<String> {
    let env = env.filter(|v| !v.trim().is_empty());
    let toml = toml.filter(|v| !v.trim().is_empty());

    if env.is_some() && toml.is_some() {
        warn!(
            setting = name,
            "Setting found in both environment and TOML config. Using environment (highest priority)."
        );
    }

    env.or(toml)
}

fn read_toml_config(path: &Path) -> TomlConfig {
    if !path.exists() {
        return TomlConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), "Failed to parse TOML config: {}", e);
                TomlConfig::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), "Failed to read TOML config: {}", e);
            TomlConfig::default()
        }
    }
}
