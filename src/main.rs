use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod routes;
mod service;
mod weather;

use cache::BoundedCache;
use config::Config;
use routes::{create_router, AppState};
use service::{SharedCache, WeatherService};
use weather::open_meteo::OpenMeteoClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_cache_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the cache and the weather lookup service
    let cache: SharedCache = Arc::new(RwLock::new(BoundedCache::new(config.cache_max_size)));
    let weather_client = Arc::new(OpenMeteoClient::new(config.clone()));
    let weather_service = Arc::new(WeatherService::new(cache.clone(), weather_client));

    // Create application state
    let state = AppState {
        cache,
        weather_service,
    };

    let app: Router = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server starting on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
