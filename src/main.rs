use anyhow::Result;
use tracing_subscriber::EnvFilter;

use travelmap::{TravelMapConfig, cache, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TravelMapConfig::load()?;
    init_tracing(&config);

    // The app keeps working without the cache, it just refetches everything
    if let Err(e) = cache::init(config.cache_dir()) {
        tracing::warn!("Cache unavailable, continuing without it: {e:#}");
    }

    tracing::info!("TravelMap {} starting", travelmap::VERSION);
    web::run(config).await
}

fn init_tracing(config: &TravelMapConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
