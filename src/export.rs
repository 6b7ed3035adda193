//! Map export pipeline
//!
//! The export runs as one explicit async task: claim the export slot,
//! validate the target resolution, wait out the settle delay, compose the
//! map, encode it as PNG. The slot is released by a guard on every exit
//! path, so a failed render can never leave the application stuck busy.

use crate::config::TravelMapConfig;
use crate::journey::JourneyState;
use crate::models::MapStyle;
use crate::render::{self, tiles::TileFetcher};
use crate::{Result, TravelMapError};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, instrument};

/// A finished export: encoded image plus its download name
#[derive(Debug, Clone)]
pub struct MapExport {
    /// Suggested file name, derived from the journey title
    pub file_name: String,
    /// PNG-encoded image bytes
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Runs map exports, one at a time
pub struct ExportController {
    busy: AtomicBool,
    settle_delay: Duration,
    max_width: u32,
    fetcher: TileFetcher,
}

impl ExportController {
    #[must_use]
    pub fn new(config: &TravelMapConfig) -> Self {
        Self {
            busy: AtomicBool::new(false),
            settle_delay: Duration::from_millis(config.export.settle_delay_ms),
            max_width: config.export.max_width,
            fetcher: TileFetcher::new(&config.tiles),
        }
    }

    /// Whether an export currently holds the slot
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Export the journey as a PNG at its configured resolution.
    ///
    /// Returns [`TravelMapError::ExportBusy`] when another export is still
    /// running; the caller decides how to surface that.
    #[instrument(skip_all, fields(width = journey.export_width, height = journey.export_height, style = style.name))]
    pub async fn export(&self, journey: &JourneyState, style: &MapStyle) -> Result<MapExport> {
        let _slot = BusyGuard::claim(&self.busy)?;

        if journey.export_width > self.max_width {
            return Err(TravelMapError::validation(format!(
                "Export width {} exceeds the maximum of {}",
                journey.export_width, self.max_width
            )));
        }

        let (width, height) = (journey.export_width, journey.export_height);
        info!(
            "Exporting '{}' at {}x{} with {} waypoints",
            journey.export_file_name(),
            width,
            height,
            journey.locations.len()
        );

        // Settle delay kept from the interactive pipeline: tile sources get a
        // moment before the capture starts
        tokio::time::sleep(self.settle_delay).await;

        let canvas = render::render_map(style, &journey.locations, width, height, &self.fetcher)
            .await
            .map_err(|e| TravelMapError::render(format!("{e:#}")))?;

        let mut cursor = Cursor::new(Vec::new());
        canvas.write_to(&mut cursor, image::ImageFormat::Png)?;

        info!("Export finished: {} bytes", cursor.get_ref().len());

        Ok(MapExport {
            file_name: journey.export_file_name(),
            png: cursor.into_inner(),
            width,
            height,
        })
    }
}

/// Exclusive claim on the export slot, released on drop
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn claim(busy: &'a AtomicBool) -> Result<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TravelMapError::ExportBusy)?;
        Ok(Self { busy })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, MAP_STYLES};
    use httpmock::prelude::*;
    use std::sync::Arc;

    fn fast_controller() -> ExportController {
        let mut config = TravelMapConfig::default();
        config.export.settle_delay_ms = 0;
        ExportController::new(&config)
    }

    fn mock_style(server: &MockServer) -> &'static MapStyle {
        let template = format!("{}/t/{{z}}/{{x}}/{{y}}.png", server.base_url());
        Box::leak(Box::new(MapStyle {
            name: "Test",
            url_template: Box::leak(template.into_boxed_str()),
            attribution: "test",
        }))
    }

    #[test]
    fn test_busy_guard_claims_and_releases() {
        let busy = AtomicBool::new(false);
        {
            let _slot = BusyGuard::claim(&busy).unwrap();
            assert!(busy.load(Ordering::Acquire));
            assert!(matches!(
                BusyGuard::claim(&busy),
                Err(TravelMapError::ExportBusy)
            ));
        }
        assert!(!busy.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_oversized_export_fails_and_releases_slot() {
        let exporter = fast_controller();
        let mut journey = JourneyState::new();
        journey.set_export_width(1_000_000);

        let result = exporter.export(&journey, &MAP_STYLES[0]).await;
        assert!(matches!(result, Err(TravelMapError::Validation { .. })));
        assert!(!exporter.is_busy());
    }

    #[tokio::test]
    async fn test_export_produces_png_with_journey_dimensions() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/t/");
                then.status(404);
            })
            .await;

        let exporter = fast_controller();
        let style = mock_style(&server);

        let mut journey = JourneyState::new();
        journey.title = "Alps Tour".to_string();
        journey.add_location(Location::from_place("Interlaken", 46.6863, 7.8632));
        journey.add_location(Location::from_place("Zermatt", 46.0207, 7.7491));
        journey.set_export_width(320);
        journey.select_shape(2).unwrap(); // 4:3

        let export = exporter.export(&journey, style).await.unwrap();
        assert_eq!(export.file_name, "Alps Tour.png");
        assert_eq!((export.width, export.height), (320, 240));

        let decoded = image::load_from_memory(&export.png).unwrap();
        assert_eq!(decoded.width(), 320);
        assert_eq!(decoded.height(), 240);
        assert!(!exporter.is_busy());
    }

    #[tokio::test]
    async fn test_concurrent_export_is_rejected_as_busy() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/t/");
                then.status(404);
            })
            .await;

        let mut config = TravelMapConfig::default();
        config.export.settle_delay_ms = 300;
        let exporter = Arc::new(ExportController::new(&config));
        let style = mock_style(&server);

        let journey = JourneyState::new();
        let first = {
            let exporter = Arc::clone(&exporter);
            let journey = journey.clone();
            tokio::spawn(async move { exporter.export(&journey, style).await })
        };

        // Give the first export time to claim the slot
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = exporter.export(&journey, style).await;
        assert!(matches!(second, Err(TravelMapError::ExportBusy)));

        let first = first.await.unwrap();
        assert!(first.is_ok());
        assert!(!exporter.is_busy());
    }
}
