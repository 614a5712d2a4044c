pub mod mock;
pub mod open_meteo;
pub mod types;

use async_trait::async_trait;

use self::open_meteo::WeatherApiError;
use self::types::ForecastResponse;

/// Upstream weather source. The real client talks to Open-Meteo; tests
/// substitute a mock behind the same seam.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResponse, WeatherApiError>;
}
