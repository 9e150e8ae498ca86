//! HTTP API handlers for waxid

pub mod candidates;
pub mod health;
pub mod identify;
pub mod library;

pub use candidates::candidate_routes;
pub use health::health_routes;
pub use identify::identify_routes;
pub use library::library_routes;
