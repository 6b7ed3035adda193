use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{self, AppState};
use crate::config::TravelMapConfig;

pub async fn run(config: TravelMapConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api::router(state))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://localhost:{}", config.server.port);
    axum::serve(listener, app).await?;
    Ok(())
}
