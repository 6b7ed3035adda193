//! HTTP API
//!
//! JSON endpoints for the journey state machine plus the PNG export route.
//! Handlers stay thin: they translate between wire DTOs and the journey
//! state, which owns all invariants.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::config::TravelMapConfig;
use crate::export::ExportController;
use crate::geocoding::{GeocodingClient, SearchResult};
use crate::journey::JourneyState;
use crate::models::{Location, MAP_SHAPES, MAP_STYLES};
use crate::TravelMapError;

/// Shared application state behind every handler
pub struct AppState {
    pub journey: RwLock<JourneyState>,
    pub geocoder: GeocodingClient,
    pub exporter: ExportController,
}

impl AppState {
    #[must_use]
    pub fn new(config: &TravelMapConfig) -> Self {
        Self {
            journey: RwLock::new(JourneyState::new()),
            geocoder: GeocodingClient::new(&config.geocoding),
            exporter: ExportController::new(config),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiLocation {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Location> for ApiLocation {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.clone(),
            name: location.name.clone(),
            full_name: location.full_name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiJourney {
    pub title: String,
    pub description: String,
    pub locations: Vec<ApiLocation>,
    pub style_index: usize,
    pub shape_index: usize,
    pub export_width: u32,
    pub export_height: u32,
    pub total_distance_km: f64,
}

impl From<&JourneyState> for ApiJourney {
    fn from(journey: &JourneyState) -> Self {
        Self {
            title: journey.title.clone(),
            description: journey.description.clone(),
            locations: journey.locations.iter().map(ApiLocation::from).collect(),
            style_index: journey.style_index,
            shape_index: journey.shape_index,
            export_width: journey.export_width,
            export_height: journey.export_height,
            total_distance_km: journey.total_distance_km(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiStyle {
    pub index: usize,
    pub name: &'static str,
    pub url_template: &'static str,
    pub attribution: &'static str,
}

#[derive(Serialize)]
pub struct ApiShape {
    pub index: usize,
    pub name: &'static str,
    pub ratio: (u32, u32),
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct UpdateJourneyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct AddLocationRequest {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Deserialize)]
pub struct SelectIndexRequest {
    pub index: usize,
}

#[derive(Deserialize)]
pub struct ExportSettingsRequest {
    pub width: u32,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/journey", get(get_journey).put(update_journey))
        .route("/search", get(search))
        .route("/locations", post(add_location))
        .route("/locations/reorder", post(reorder_location))
        .route("/locations/{id}", delete(remove_location))
        .route("/styles", get(list_styles))
        .route("/shapes", get(list_shapes))
        .route("/style", put(select_style))
        .route("/shape", put(select_shape))
        .route("/export/settings", put(update_export_settings))
        .route("/export", post(export_map))
        .with_state(state)
}

async fn get_journey(State(state): State<Arc<AppState>>) -> Json<ApiJourney> {
    let journey = state.journey.read().await;
    Json(ApiJourney::from(&*journey))
}

async fn update_journey(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateJourneyRequest>,
) -> Json<ApiJourney> {
    let mut journey = state.journey.write().await;
    if let Some(title) = request.title {
        journey.title = title;
    }
    if let Some(description) = request.description {
        journey.description = description;
    }
    Json(ApiJourney::from(&*journey))
}

/// Search failures degrade silently: the client keeps its previous list and
/// the error only shows up in the logs
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<SearchResult>> {
    match state.geocoder.search(&params.q).await {
        Ok(results) => Json(results),
        Err(e) => {
            warn!("Location search failed: {e:#}");
            Json(Vec::new())
        }
    }
}

async fn add_location(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddLocationRequest>,
) -> (StatusCode, Json<ApiLocation>) {
    let location = Location::from_place(&request.display_name, request.latitude, request.longitude);
    let response = ApiLocation::from(&location);
    state.journey.write().await.add_location(location);
    (StatusCode::CREATED, Json(response))
}

async fn remove_location(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    state.journey.write().await.remove_location(&id);
    StatusCode::NO_CONTENT
}

async fn reorder_location(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<ApiJourney>, StatusCode> {
    let mut journey = state.journey.write().await;
    journey
        .reorder_location(request.from, request.to)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(ApiJourney::from(&*journey)))
}

async fn list_styles() -> Json<Vec<ApiStyle>> {
    let styles = MAP_STYLES
        .iter()
        .enumerate()
        .map(|(index, style)| ApiStyle {
            index,
            name: style.name,
            url_template: style.url_template,
            attribution: style.attribution,
        })
        .collect();
    Json(styles)
}

async fn list_shapes() -> Json<Vec<ApiShape>> {
    let shapes = MAP_SHAPES
        .iter()
        .enumerate()
        .map(|(index, shape)| ApiShape {
            index,
            name: shape.name,
            ratio: shape.ratio,
        })
        .collect();
    Json(shapes)
}

async fn select_style(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectIndexRequest>,
) -> Result<Json<ApiJourney>, StatusCode> {
    let mut journey = state.journey.write().await;
    journey
        .select_style(request.index)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(ApiJourney::from(&*journey)))
}

async fn select_shape(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectIndexRequest>,
) -> Result<Json<ApiJourney>, StatusCode> {
    let mut journey = state.journey.write().await;
    journey
        .select_shape(request.index)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(ApiJourney::from(&*journey)))
}

async fn update_export_settings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportSettingsRequest>,
) -> Json<ApiJourney> {
    let mut journey = state.journey.write().await;
    journey.set_export_width(request.width);
    Json(ApiJourney::from(&*journey))
}

async fn export_map(State(state): State<Arc<AppState>>) -> Response {
    let journey = state.journey.read().await.clone();
    let style = journey.style();

    match state.exporter.export(&journey, style).await {
        Ok(export) => {
            let disposition = format!("attachment; filename=\"{}\"", export.file_name);
            (
                [
                    (header::CONTENT_TYPE, "image/png".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.png,
            )
                .into_response()
        }
        Err(TravelMapError::ExportBusy) => {
            (StatusCode::CONFLICT, TravelMapError::ExportBusy.user_message()).into_response()
        }
        Err(e @ TravelMapError::Validation { .. }) => {
            (StatusCode::BAD_REQUEST, e.user_message()).into_response()
        }
        Err(e) => {
            error!("Map export failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.user_message()).into_response()
        }
    }
}
