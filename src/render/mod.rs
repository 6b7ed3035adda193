//! Map composition
//!
//! Turns a journey into a raster: fits a viewport around the waypoints,
//! assembles the tile grid for the selected style, then stamps the route
//! overlay on top. Tile failures degrade to the canvas background; the
//! capture is best-effort by design of the original pipeline.

pub mod overlay;
pub mod tiles;

use crate::models::{Location, MapStyle};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use image::{Rgba, RgbaImage};
use tiles::{TILE_SIZE, TileFetcher};
use tracing::{debug, instrument, warn};

/// Viewport padding around the fitted bounds, in pixels
pub const FIT_PADDING: u32 = 50;

/// World view shown when the journey has no locations yet
pub const DEFAULT_CENTER: (f64, f64) = (20.0, 0.0);

/// Zoom of the default world view
pub const DEFAULT_ZOOM: u8 = 2;

/// Zoom used when the fitted bounds collapse to a single point
const POINT_ZOOM: u8 = 16;

/// Canvas background where no tile could be placed
const BACKGROUND: Rgba<u8> = Rgba([221, 221, 221, 255]);

/// A resolved map viewport: center coordinate plus zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: (f64, f64),
    pub zoom: u8,
}

/// Fit a viewport around the given locations for a target canvas size.
///
/// With no locations the default world view is returned (no fitting
/// happens). Otherwise the highest zoom is chosen at which the padded
/// bounding box of all points fits the canvas.
#[must_use]
pub fn fit_viewport(locations: &[Location], width: u32, height: u32) -> Viewport {
    if locations.is_empty() {
        return Viewport {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        };
    }

    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    for location in locations {
        min_lat = min_lat.min(location.latitude);
        max_lat = max_lat.max(location.latitude);
        min_lon = min_lon.min(location.longitude);
        max_lon = max_lon.max(location.longitude);
    }

    // Degenerate bounds: a single waypoint (or stacked ones) has no span to
    // fit, so use a fixed city-scale zoom
    if (max_lat - min_lat).abs() < 1e-9 && (max_lon - min_lon).abs() < 1e-9 {
        return Viewport {
            center: (min_lat, min_lon),
            zoom: POINT_ZOOM,
        };
    }

    let avail_width = f64::from(width.saturating_sub(2 * FIT_PADDING).max(1));
    let avail_height = f64::from(height.saturating_sub(2 * FIT_PADDING).max(1));

    for zoom in (0..=tiles::MAX_ZOOM).rev() {
        // North-west and south-east corners in pixel space
        let (x0, y0) = tiles::project(max_lat, min_lon, zoom);
        let (x1, y1) = tiles::project(min_lat, max_lon, zoom);
        if x1 - x0 <= avail_width && y1 - y0 <= avail_height {
            let center = tiles::unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, zoom);
            return Viewport { center, zoom };
        }
    }

    let (x0, y0) = tiles::project(max_lat, min_lon, 0);
    let (x1, y1) = tiles::project(min_lat, max_lon, 0);
    Viewport {
        center: tiles::unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, 0),
        zoom: 0,
    }
}

/// Compose the map for a set of waypoints at the given pixel size
#[instrument(skip_all, fields(style = style.name, locations = locations.len(), width, height))]
pub async fn render_map(
    style: &MapStyle,
    locations: &[Location],
    width: u32,
    height: u32,
    fetcher: &TileFetcher,
) -> Result<RgbaImage> {
    let viewport = fit_viewport(locations, width, height);
    debug!(
        "Viewport center ({:.4}, {:.4}) at zoom {}",
        viewport.center.0, viewport.center.1, viewport.zoom
    );

    let (center_x, center_y) = tiles::project(viewport.center.0, viewport.center.1, viewport.zoom);
    let origin_x = center_x - f64::from(width) / 2.0;
    let origin_y = center_y - f64::from(height) / 2.0;

    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    let tile_span = f64::from(TILE_SIZE);
    let first_col = (origin_x / tile_span).floor() as i64;
    let last_col = ((origin_x + f64::from(width) - 1.0) / tile_span).floor() as i64;
    let first_row = (origin_y / tile_span).floor() as i64;
    let last_row = ((origin_y + f64::from(height) - 1.0) / tile_span).floor() as i64;

    let addresses: Vec<(i64, i64)> = (first_row..=last_row)
        .flat_map(|row| (first_col..=last_col).map(move |col| (col, row)))
        .collect();

    let fetched: Vec<((i64, i64), _)> = stream::iter(addresses)
        .map(|(col, row)| async move {
            ((col, row), fetcher.fetch(style, viewport.zoom, col, row).await)
        })
        .buffer_unordered(16)
        .collect()
        .await;

    for ((col, row), outcome) in fetched {
        match outcome {
            Ok(Some(tile)) => {
                let x = (col as f64 * tile_span - origin_x).round() as i64;
                let y = (row as f64 * tile_span - origin_y).round() as i64;
                image::imageops::overlay(&mut canvas, &tile, x, y);
            }
            Ok(None) => {}
            Err(e) => {
                // Best-effort capture: a missing tile leaves background showing
                warn!("Tile {}/{}/{} unavailable: {e:#}", viewport.zoom, col, row);
            }
        }
    }

    let points: Vec<(f64, f64)> = locations
        .iter()
        .map(|location| {
            let (x, y) = tiles::project(location.latitude, location.longitude, viewport.zoom);
            (x - origin_x, y - origin_y)
        })
        .collect();

    if points.len() >= 2 {
        overlay::draw_route(&mut canvas, &points);
    }
    overlay::draw_markers(&mut canvas, &points);

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use httpmock::prelude::*;
    use std::io::Cursor;

    fn spot(latitude: f64, longitude: f64) -> Location {
        Location::from_place("Spot", latitude, longitude)
    }

    #[test]
    fn test_fit_viewport_empty_uses_world_view() {
        let viewport = fit_viewport(&[], 1920, 1080);
        assert_eq!(viewport.center, DEFAULT_CENTER);
        assert_eq!(viewport.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_fit_viewport_single_point() {
        let viewport = fit_viewport(&[spot(48.8566, 2.3522)], 1920, 1080);
        assert_eq!(viewport.center, (48.8566, 2.3522));
        assert_eq!(viewport.zoom, POINT_ZOOM);
    }

    #[test]
    fn test_fit_viewport_bounds_fit_with_padding() {
        let locations = [spot(48.8566, 2.3522), spot(45.7640, 4.8357)];
        let viewport = fit_viewport(&locations, 1024, 768);

        let (x0, y0) = tiles::project(48.8566, 2.3522, viewport.zoom);
        let (x1, y1) = tiles::project(45.7640, 4.8357, viewport.zoom);
        assert!((x1 - x0).abs() <= f64::from(1024 - 2 * FIT_PADDING));
        assert!((y1 - y0).abs() <= f64::from(768 - 2 * FIT_PADDING));

        // One zoom deeper must not fit anymore, otherwise the fit is not maximal
        let (x0, y0) = tiles::project(48.8566, 2.3522, viewport.zoom + 1);
        let (x1, y1) = tiles::project(45.7640, 4.8357, viewport.zoom + 1);
        assert!(
            (x1 - x0).abs() > f64::from(1024 - 2 * FIT_PADDING)
                || (y1 - y0).abs() > f64::from(768 - 2 * FIT_PADDING)
        );
    }

    #[test]
    fn test_fit_viewport_wide_spread_zooms_out() {
        let locations = [spot(48.8566, 2.3522), spot(-33.8688, 151.2093)];
        let viewport = fit_viewport(&locations, 800, 600);
        assert!(viewport.zoom <= 2);
    }

    fn tile_png(color: [u8; 4]) -> Vec<u8> {
        let tile = RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, Rgba(color));
        let mut cursor = Cursor::new(Vec::new());
        tile.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn mock_style(server: &MockServer) -> &'static MapStyle {
        let template = format!("{}/t/{{z}}/{{x}}/{{y}}.png", server.base_url());
        Box::leak(Box::new(MapStyle {
            name: "Test",
            url_template: Box::leak(template.into_boxed_str()),
            attribution: "test",
        }))
    }

    #[tokio::test]
    async fn test_render_map_composes_tiles_and_route() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/t/");
                then.status(200)
                    .header("content-type", "image/png")
                    .body(tile_png([10, 200, 10, 255]));
            })
            .await;

        let style = mock_style(&server);
        let fetcher = TileFetcher::new(&crate::config::TileConfig::default());
        let locations = [spot(48.8566, 2.3522), spot(45.7640, 4.8357)];

        let canvas = render_map(style, &locations, 400, 300, &fetcher)
            .await
            .unwrap();

        assert_eq!(canvas.dimensions(), (400, 300));
        // A corner pixel shows the tile fill, untouched by route or markers
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([10, 200, 10, 255]));
        // The two waypoints are centered in the fitted viewport, so the route
        // crosses the middle of the canvas and darkens it
        assert_ne!(*canvas.get_pixel(200, 150), Rgba([10, 200, 10, 255]));
    }

    #[tokio::test]
    async fn test_render_map_survives_missing_tiles() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/t/");
                then.status(404);
            })
            .await;

        let style = mock_style(&server);
        let fetcher = TileFetcher::new(&crate::config::TileConfig::default());

        let canvas = render_map(style, &[], 200, 150, &fetcher).await.unwrap();
        assert_eq!(canvas.dimensions(), (200, 150));
        assert_eq!(*canvas.get_pixel(100, 75), BACKGROUND);
    }
}
