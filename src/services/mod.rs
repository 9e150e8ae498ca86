//! Provider clients and the identification orchestrator

pub mod discogs_client;
pub mod identifier;
pub mod spotify_client;
pub mod vision_client;

pub use discogs_client::DiscogsClient;
pub use identifier::Identifier;
pub use spotify_client::SpotifyClient;
pub use vision_client::VisionClient;
