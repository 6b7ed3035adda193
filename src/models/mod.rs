//! Data models for the TravelMap application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic points collected into a journey
//! - Style: Tile layer style catalog
//! - Shape: Export aspect ratio catalog

pub mod location;
pub mod shape;
pub mod style;

// Re-export all public types for convenient access
pub use location::Location;
pub use shape::{MAP_SHAPES, MIN_EXPORT_WIDTH, MapShape};
pub use style::{MAP_STYLES, MapStyle};
