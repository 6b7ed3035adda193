//! Location model for journey waypoints

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A named geographic point in a journey
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Opaque unique token identifying this entry
    pub id: String,
    /// Short label (first segment of the full place name)
    pub name: String,
    /// Full descriptive place name
    pub full_name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Location {
    /// Create a new location with a freshly generated id
    #[must_use]
    pub fn new(name: String, full_name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            id: next_id(),
            name,
            full_name,
            latitude,
            longitude,
        }
    }

    /// Build a location from a geocoder place record, deriving the short
    /// label from the first comma-separated segment of the display name
    #[must_use]
    pub fn from_place(display_name: &str, latitude: f64, longitude: f64) -> Self {
        let name = display_name
            .split(',')
            .next()
            .unwrap_or(display_name)
            .trim()
            .to_string();
        Self::new(name, display_name.to_string(), latitude, longitude)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Ids are time-ordered; the counter keeps ids from the same millisecond unique.
fn next_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{seq}", Utc::now().timestamp_millis())
}
