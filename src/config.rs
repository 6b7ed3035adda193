//! Configuration management for the `TravelMap` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelMapError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TravelMap` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TravelMapConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Geocoding search configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Tile retrieval configuration
    #[serde(default)]
    pub tiles: TileConfig,
    /// Map export configuration
    #[serde(default)]
    pub export: ExportConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the web server on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory served as the web front-end fallback
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Geocoding search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the geocoding service
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Maximum number of search results kept per query
    #[serde(default = "default_geocoding_max_results")]
    pub max_results: usize,
    /// Cache TTL for geocoding responses in hours
    #[serde(default = "default_geocoding_cache_ttl")]
    pub cache_ttl_hours: u32,
}

/// Tile retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    /// Concurrent tile downloads per export
    #[serde(default = "default_tile_concurrency")]
    pub concurrency: usize,
    /// Cache TTL for tile bytes in hours
    #[serde(default = "default_tile_cache_ttl")]
    pub cache_ttl_hours: u32,
}

/// Map export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Delay before capture, giving tile sources time to settle, in milliseconds
    #[serde(default = "default_export_settle_delay")]
    pub settle_delay_ms: u64,
    /// Upper bound on the export width in pixels
    #[serde(default = "default_export_max_width")]
    pub max_width: u32,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoding_max_results() -> usize {
    5
}

fn default_geocoding_cache_ttl() -> u32 {
    24
}

fn default_tile_concurrency() -> usize {
    8
}

fn default_tile_cache_ttl() -> u32 {
    168
}

fn default_export_settle_delay() -> u64 {
    500
}

fn default_export_max_width() -> u32 {
    8192
}

fn default_cache_location() -> String {
    "~/.cache/travelmap".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            max_results: default_geocoding_max_results(),
            cache_ttl_hours: default_geocoding_cache_ttl(),
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            concurrency: default_tile_concurrency(),
            cache_ttl_hours: default_tile_cache_ttl(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_export_settle_delay(),
            max_width: default_export_max_width(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TravelMapConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with TRAVELMAP_ prefix,
        // e.g. TRAVELMAP_SERVER__PORT=3000
        builder = builder.add_source(
            Environment::with_prefix("TRAVELMAP")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TravelMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travelmap").join("config.toml"))
    }

    /// Resolve the cache directory, expanding a leading `~`
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(rest) = self.cache.location.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(&self.cache.location)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.max_results == 0 || self.geocoding.max_results > 50 {
            return Err(
                TravelMapError::config("Geocoding max results must be between 1 and 50").into(),
            );
        }

        if self.tiles.concurrency == 0 || self.tiles.concurrency > 64 {
            return Err(
                TravelMapError::config("Tile concurrency must be between 1 and 64").into(),
            );
        }

        if self.export.settle_delay_ms > 10_000 {
            return Err(
                TravelMapError::config("Export settle delay cannot exceed 10000 ms").into(),
            );
        }

        if self.export.max_width < crate::models::MIN_EXPORT_WIDTH {
            return Err(TravelMapError::config(format!(
                "Export max width cannot be below the minimum width of {}",
                crate::models::MIN_EXPORT_WIDTH
            ))
            .into());
        }

        if self.geocoding.cache_ttl_hours > 720 || self.tiles.cache_ttl_hours > 720 {
            return Err(
                TravelMapError::config("Cache TTL cannot exceed 720 hours (30 days)").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.geocoding.base_url.starts_with("http://")
            && !self.geocoding.base_url.starts_with("https://")
        {
            return Err(TravelMapError::config(
                "Geocoding base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
