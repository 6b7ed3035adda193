//! `TravelMap` - travel route map builder
//!
//! This library provides the core functionality for location search,
//! journey state management, and server-side map composition with
//! PNG export.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod geocoding;
pub mod journey;
pub mod models;
pub mod render;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::TravelMapConfig;
pub use error::TravelMapError;
pub use export::{ExportController, MapExport};
pub use geocoding::{GeocodingClient, SearchResult};
pub use journey::JourneyState;
pub use models::{Location, MAP_SHAPES, MAP_STYLES, MapShape, MapStyle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelMapError>;

/// Shared HTTP client with transient-error retry, used for every upstream
/// call (geocoding, tile servers)
pub static HTTP_CLIENT: LazyLock<ClientWithMiddleware> = LazyLock::new(|| {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(2);
    let client = reqwest::Client::builder()
        .user_agent(concat!("TravelMap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client");
    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
