use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    cache::CacheStatus,
    service::{SharedCache, WeatherService},
    weather::{
        open_meteo::OpenMeteoClient,
        types::{CurrentUnits, CurrentWeather, ForecastResponse, HourlySeries, HourlyUnits},
    },
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    pub weather_service: Arc<WeatherService<OpenMeteoClient>>,
}

// Request/Response types
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherQuery {
    /// Latitude of the location
    pub latitude: f64,
    /// Longitude of the location
    pub longitude: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResizeRequest {
    /// New maximum number of cached entries, must be positive
    pub size: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Cache API",
        description = "Caching proxy for the Open-Meteo forecast API. Responses are cached per location and hour, with FIFO eviction once the cache is full."
    ),
    servers((url = "/api", description = "Primary API mount")),
    paths(get_weather, clear_cache, set_cache_size, cache_status),
    components(schemas(
        ForecastResponse,
        CurrentUnits,
        CurrentWeather,
        HourlyUnits,
        HourlySeries,
        CacheStatus,
        ResizeRequest,
        MessageResponse
    ))
)]
pub struct ApiDoc;

// Route handlers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Weather for a location, served from the cache when the same coordinates
/// were fetched within the current hour.
#[utoipa::path(
    get,
    path = "/weather",
    tag = "weather",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Weather data for the requested location", body = ForecastResponse),
        (status = 400, description = "Missing or invalid coordinates"),
        (status = 500, description = "Upstream weather provider failure")
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<ForecastResponse>, StatusCode> {
    if !is_valid_coordinates(params.latitude, params.longitude) {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state
        .weather_service
        .get_weather(params.latitude, params.longitude)
        .await
    {
        Ok(forecast) => Ok(Json(forecast)),
        Err(e) => {
            tracing::error!("Weather lookup failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/weather/cache",
    tag = "weather",
    responses(
        (status = 200, description = "Cache cleared", body = MessageResponse)
    )
)]
pub async fn clear_cache(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.write().await.clear();
    tracing::info!("Cache cleared");
    Json(MessageResponse {
        message: "Cache cleared".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/weather/cache/size",
    tag = "weather",
    request_body = ResizeRequest,
    responses(
        (status = 200, description = "Cache size updated", body = MessageResponse),
        (status = 400, description = "Size must be a positive number")
    )
)]
pub async fn set_cache_size(
    State(state): State<AppState>,
    Json(request): Json<ResizeRequest>,
) -> Result<Json<MessageResponse>, StatusCode> {
    if request.size == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    state.cache.write().await.set_max_size(request.size as usize);
    tracing::info!("Cache size updated to {}", request.size);
    Ok(Json(MessageResponse {
        message: "Cache size updated".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/weather/cache/status",
    tag = "weather",
    responses(
        (status = 200, description = "Current and maximum cache sizes", body = CacheStatus)
    )
)]
pub async fn cache_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.cache.read().await.status())
}

fn is_valid_coordinates(lat: f64, lon: f64) -> bool {
    lat >= -90.0 && lat <= 90.0 && lon >= -180.0 && lon <= 180.0
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/weather", get(get_weather))
        .route("/weather/cache", delete(clear_cache))
        .route("/weather/cache/size", post(set_cache_size))
        .route("/weather/cache/status", get(cache_status))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
