//! Slippy-map tile plumbing
//!
//! Web Mercator projection math and tile retrieval for the map compositor.
//! Tiles are fetched through the shared retrying HTTP client, cached as raw
//! bytes, and decoded on the way out.

use crate::config::TileConfig;
use crate::models::MapStyle;
use crate::{HTTP_CLIENT, cache};
use anyhow::{Context, Result};
use image::RgbaImage;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Square tile edge in pixels
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom level requested from tile servers
pub const MAX_ZOOM: u8 = 18;

/// Latitude bound of the Web Mercator projection
pub const MAX_LATITUDE: f64 = 85.051_128;

/// Subdomains rotated into `{s}` URL slots
const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Side length of the projected world in pixels at `zoom`
#[must_use]
pub fn world_size(zoom: u8) -> u64 {
    u64::from(TILE_SIZE) << zoom
}

/// Project a coordinate to global pixel space at `zoom`
#[must_use]
pub fn project(latitude: f64, longitude: f64, zoom: u8) -> (f64, f64) {
    let world = world_size(zoom) as f64;
    let x = (longitude + 180.0) / 360.0 * world;
    let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * world;
    (x, y)
}

/// Inverse of [`project`]: global pixel position back to (latitude, longitude)
#[must_use]
pub fn unproject(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let world = world_size(zoom) as f64;
    let longitude = x / world * 360.0 - 180.0;
    let latitude = (std::f64::consts::PI * (1.0 - 2.0 * y / world))
        .sinh()
        .atan()
        .to_degrees();
    (latitude, longitude)
}

/// Wrap a tile column index into the valid range, carrying the map across
/// the antimeridian
#[must_use]
pub fn wrap_tile_x(x: i64, zoom: u8) -> u32 {
    let n = 1_i64 << zoom;
    (x.rem_euclid(n)) as u32
}

/// Retrieves and caches map tiles for one style
pub struct TileFetcher {
    permits: Semaphore,
    cache_ttl: Duration,
}

impl TileFetcher {
    #[must_use]
    pub fn new(config: &TileConfig) -> Self {
        Self {
            permits: Semaphore::new(config.concurrency),
            cache_ttl: Duration::from_secs(u64::from(config.cache_ttl_hours) * 3600),
        }
    }

    /// Fetch one tile. Columns wrap around the antimeridian; rows outside the
    /// projected world return `None` and are left to the canvas background.
    pub async fn fetch(&self, style: &MapStyle, zoom: u8, x: i64, y: i64) -> Result<Option<RgbaImage>> {
        let rows = 1_i64 << zoom;
        if y < 0 || y >= rows {
            return Ok(None);
        }
        let x = wrap_tile_x(x, zoom);
        let y = y as u32;

        let cache_key = format!("tile:{}:{}/{}/{}", style.name, zoom, x, y);
        let bytes = match cache::get::<Vec<u8>>(&cache_key).await? {
            Some(bytes) => bytes,
            None => {
                let url = tile_url(style, zoom, x, y);
                let permit = self.permits.acquire().await?;
                let response = HTTP_CLIENT
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("Tile request failed: {url}"))?
                    .error_for_status()
                    .with_context(|| format!("Tile server rejected request: {url}"))?;
                let bytes = response
                    .bytes()
                    .await
                    .with_context(|| format!("Tile download failed: {url}"))?
                    .to_vec();
                drop(permit);
                cache::put(&cache_key, bytes.clone(), cache::jittered(self.cache_ttl)).await?;
                bytes
            }
        };

        let tile = image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode tile {}/{}/{}", zoom, x, y))?
            .to_rgba8();
        Ok(Some(tile))
    }
}

/// Expand a style URL template for one tile address
fn tile_url(style: &MapStyle, zoom: u8, x: u32, y: u32) -> String {
    let subdomain = SUBDOMAINS[((x + y) as usize) % SUBDOMAINS.len()];
    style
        .url_template
        .replace("{s}", subdomain)
        .replace("{r}", "")
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}
