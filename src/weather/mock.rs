use super::open_meteo::WeatherApiError;
use super::types::*;
use super::WeatherProvider;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Offline stand-in for the Open-Meteo client. Payloads are a pure function
/// of the coordinates, and every fetch is counted so tests can assert how
/// often the upstream was actually consulted.
pub struct MockWeatherClient {
    fetch_count: AtomicUsize,
}

impl MockWeatherClient {
    pub fn new() -> Self {
        Self {
            fetch_count: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl Default for MockWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherClient {
    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResponse, WeatherApiError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(sample_forecast(latitude, longitude))
    }
}

/// Generates a plausible forecast for the given location.
pub fn sample_forecast(latitude: f64, longitude: f64) -> ForecastResponse {
    let now = Utc::now();
    let base_temp = 20.0 - 0.3 * latitude.abs();
    let base_wind = 2.0 + 0.01 * longitude.abs();

    let mut time = Vec::new();
    let mut temperature_2m = Vec::new();
    let mut relative_humidity_2m = Vec::new();
    let mut wind_speed_10m = Vec::new();
    for hour in 0..24 {
        let ts = now + Duration::hours(hour);
        let phase = hour as f64 * std::f64::consts::PI / 12.0;
        time.push(ts.format("%Y-%m-%dT%H:00").to_string());
        temperature_2m.push(base_temp + 5.0 * phase.sin()); // Diurnal variation
        relative_humidity_2m.push((60.0 - 15.0 * phase.sin()).clamp(20.0, 95.0));
        wind_speed_10m.push(base_wind + 1.5 * phase.cos().abs());
    }

    ForecastResponse {
        latitude,
        longitude,
        generationtime_ms: 0.05,
        utc_offset_seconds: 0,
        timezone: "GMT".to_string(),
        timezone_abbreviation: "GMT".to_string(),
        elevation: 38.0,
        current_units: CurrentUnits {
            time: "iso8601".to_string(),
            interval: "seconds".to_string(),
            temperature_2m: "°C".to_string(),
            wind_speed_10m: "km/h".to_string(),
        },
        current: CurrentWeather {
            time: now.format("%Y-%m-%dT%H:%M").to_string(),
            interval: 900,
            temperature_2m: base_temp,
            wind_speed_10m: base_wind,
        },
        hourly_units: HourlyUnits {
            time: "iso8601".to_string(),
            temperature_2m: "°C".to_string(),
            relative_humidity_2m: "%".to_string(),
            wind_speed_10m: "km/h".to_string(),
        },
        hourly: HourlySeries {
            time,
            temperature_2m,
            relative_humidity_2m,
            wind_speed_10m,
        },
    }
}
