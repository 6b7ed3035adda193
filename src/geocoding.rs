//! Geocoding search client
//!
//! Free-text place search against the Nominatim search API. Results are
//! capped to a small candidate list and cached with a jittered TTL so
//! repeated queries stay off the upstream service.

use crate::config::GeocodingConfig;
use crate::{HTTP_CLIENT, cache};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// A geocoding candidate offered for selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Upstream place identifier
    pub place_id: u64,
    /// Full descriptive place name
    pub display_name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Client for the Nominatim search endpoint
pub struct GeocodingClient {
    base_url: String,
    max_results: usize,
    cache_ttl: Duration,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(config: &GeocodingConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
            cache_ttl: Duration::from_secs(u64::from(config.cache_ttl_hours) * 3600),
        }
    }

    /// Client against a specific base URL with default limits
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = GeocodingConfig::default();
        config.base_url = base_url.into();
        Self::new(&config)
    }

    /// Search for places matching a free-text query. Empty or whitespace-only
    /// queries short-circuit to an empty list without a request.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let cache_key = format!("geocode:{}", query.to_lowercase());
        if let Some(cached) = cache::get::<Vec<SearchResult>>(&cache_key).await? {
            debug!("Geocoding cache hit for '{}'", query);
            return Ok(cached);
        }

        let url = format!(
            "{}/search?format=json&q={}",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = HTTP_CLIENT
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Geocoding request failed for '{query}'"))?
            .error_for_status()
            .with_context(|| format!("Geocoding service rejected query '{query}'"))?;

        let places: Vec<nominatim::Place> = response
            .json()
            .await
            .with_context(|| "Failed to parse geocoding response")?;

        let results: Vec<SearchResult> = places
            .into_iter()
            .filter_map(|place| match SearchResult::try_from(place) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Skipping malformed place record: {}", e);
                    None
                }
            })
            .take(self.max_results)
            .collect();

        if results.is_empty() {
            debug!("No geocoding results for '{}'", query);
        } else {
            debug!("Found {} geocoding results for '{}'", results.len(), query);
        }

        cache::put(&cache_key, results.clone(), cache::jittered(self.cache_ttl)).await?;

        Ok(results)
    }
}

/// Nominatim wire format
mod nominatim {
    use serde::Deserialize;

    /// Place record from the search API; coordinates arrive as strings
    #[derive(Debug, Deserialize)]
    pub struct Place {
        pub place_id: u64,
        pub display_name: String,
        pub lat: String,
        pub lon: String,
    }
}

impl TryFrom<nominatim::Place> for SearchResult {
    type Error = anyhow::Error;

    fn try_from(place: nominatim::Place) -> Result<Self> {
        let latitude: f64 = place
            .lat
            .parse()
            .with_context(|| format!("Invalid latitude: {}", place.lat))?;
        let longitude: f64 = place
            .lon
            .parse()
            .with_context(|| format!("Invalid longitude: {}", place.lon))?;
        Ok(Self {
            place_id: place.place_id,
            display_name: place.display_name,
            latitude,
            longitude,
        })
    }
}
