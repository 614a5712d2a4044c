use super::types::ForecastResponse;
use super::WeatherProvider;
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Error, Debug)]
pub enum WeatherApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("Rate limited, retry after: {0}s")]
    RateLimited(u64),
    #[error("API error: {0}")]
    ApiError(String),
}

pub struct OpenMeteoClient {
    client: Client,
    config: Config,
}

impl OpenMeteoClient {
    pub fn new(config: Config) -> Self {
        let client = Client::builder()
            .user_agent("WeatherCacheServer/1.0")
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    async fn make_request_with_retry(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, WeatherApiError> {
        let mut retry_count = 0;
        let max_retries = 3;
        let mut delay = Duration::from_millis(1000);

        loop {
            let response = self.client.get(url).query(params).send().await?;

            match response.status() {
                reqwest::StatusCode::OK => {
                    let json: Value = response.json().await?;
                    return Ok(json);
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retry_count >= max_retries {
                        return Err(WeatherApiError::RateLimited(delay.as_secs()));
                    }

                    tracing::warn!(
                        "Rate limited by weather API, retrying in {}ms",
                        delay.as_millis()
                    );

                    sleep(delay).await;
                    delay = delay.mul_f32(2.0 + fastrand::f32() * 0.5); // Exponential backoff with jitter
                    retry_count += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(WeatherApiError::ApiError(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResponse, WeatherApiError> {
        let response = self
            .make_request_with_retry(&self.config.weather_api_url, &[
                ("latitude", &latitude.to_string()),
                ("longitude", &longitude.to_string()),
                ("current", "temperature_2m,wind_speed_10m"),
                ("hourly", "temperature_2m,relative_humidity_2m,wind_speed_10m"),
            ])
            .await?;

        let forecast: ForecastResponse = serde_json::from_value(response)?;
        Ok(forecast)
    }
}
