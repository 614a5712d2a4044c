use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::BoundedCache;
use crate::weather::open_meteo::WeatherApiError;
use crate::weather::types::ForecastResponse;
use crate::weather::WeatherProvider;

pub type SharedCache = Arc<RwLock<BoundedCache<ForecastResponse>>>;

/// Weather lookup orchestrator: answers from the cache when the same
/// location was fetched within the current hour, otherwise fetches from the
/// provider and populates the cache.
pub struct WeatherService<P> {
    cache: SharedCache,
    provider: Arc<P>,
}

impl<P: WeatherProvider> WeatherService<P> {
    pub fn new(cache: SharedCache, provider: Arc<P>) -> Self {
        Self { cache, provider }
    }

    pub async fn get_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResponse, WeatherApiError> {
        self.get_weather_at(latitude, longitude, Local::now()).await
    }

    async fn get_weather_at(
        &self,
        latitude: f64,
        longitude: f64,
        now: DateTime<Local>,
    ) -> Result<ForecastResponse, WeatherApiError> {
        let key = cache_key(latitude, longitude, &time_bucket(now));

        if let Some(cached) = self.cache.read().await.get(&key).cloned() {
            tracing::debug!("Cache hit for {}", key);
            return Ok(cached);
        }

        tracing::debug!("Cache miss for {}, fetching from provider", key);
        let forecast = self.provider.fetch_weather(latitude, longitude).await?;
        self.cache.write().await.put(key, forecast.clone());
        Ok(forecast)
    }
}

/// Current time truncated to hour granularity. Rolling into a new hour
/// changes every derived cache key, so entries go stale without any timer.
fn time_bucket(now: DateTime<Local>) -> String {
    now.format("%Y%m%d%H").to_string()
}

fn cache_key(latitude: f64, longitude: f64, bucket: &str) -> String {
    format!("{},{},{}", latitude, longitude, bucket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_MAX_SIZE;
    use crate::weather::mock::MockWeatherClient;
    use chrono::TimeZone;

    fn make_service() -> (WeatherService<MockWeatherClient>, Arc<MockWeatherClient>, SharedCache) {
        let cache: SharedCache = Arc::new(RwLock::new(BoundedCache::new(DEFAULT_MAX_SIZE)));
        let provider = Arc::new(MockWeatherClient::new());
        let service = WeatherService::new(cache.clone(), provider.clone());
        (service, provider, cache)
    }

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_time_bucket_format() {
        assert_eq!(time_bucket(at(2024, 3, 7, 9, 15)), "2024030709");
        assert_eq!(time_bucket(at(2024, 12, 31, 23, 59)), "2024123123");
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key(10.5, -20.25, "2024030709"), "10.5,-20.25,2024030709");
    }

    #[test]
    fn test_same_hour_same_key() {
        // Minutes within the hour never change the bucket
        assert_eq!(time_bucket(at(2024, 3, 7, 9, 0)), time_bucket(at(2024, 3, 7, 9, 59)));
    }

    #[tokio::test]
    async fn test_second_lookup_within_hour_hits_cache() {
        let (service, provider, _cache) = make_service();
        let now = at(2024, 3, 7, 9, 10);

        let first = service.get_weather_at(10.0, 20.0, now).await.unwrap();
        let second = service.get_weather_at(10.0, 20.0, at(2024, 3, 7, 9, 45)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.fetch_count(), 1); // second call never reached the provider
    }

    #[tokio::test]
    async fn test_hour_rollover_fetches_again() {
        let (service, provider, cache) = make_service();

        service.get_weather_at(10.0, 20.0, at(2024, 3, 7, 9, 59)).await.unwrap();
        service.get_weather_at(10.0, 20.0, at(2024, 3, 7, 10, 0)).await.unwrap();

        assert_eq!(provider.fetch_count(), 2);
        // Both hour buckets are cached independently
        assert_eq!(cache.read().await.status().size, 2);
    }

    #[tokio::test]
    async fn test_distinct_locations_fetch_independently() {
        let (service, provider, _cache) = make_service();
        let now = at(2024, 3, 7, 9, 0);

        let a = service.get_weather_at(10.0, 20.0, now).await.unwrap();
        let b = service.get_weather_at(48.85, 2.35, now).await.unwrap();

        assert_eq!(provider.fetch_count(), 2);
        assert_ne!(a.latitude, b.latitude);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let (service, provider, cache) = make_service();
        let now = at(2024, 3, 7, 9, 0);

        service.get_weather_at(10.0, 20.0, now).await.unwrap();
        cache.write().await.clear();
        service.get_weather_at(10.0, 20.0, now).await.unwrap();

        assert_eq!(provider.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_cached_payload_returned_unchanged() {
        let (service, _provider, _cache) = make_service();
        let now = at(2024, 3, 7, 9, 0);

        let fetched = service.get_weather_at(55.75, 37.61, now).await.unwrap();
        let cached = service.get_weather_at(55.75, 37.61, now).await.unwrap();

        assert_eq!(cached.current.temperature_2m, fetched.current.temperature_2m);
        assert_eq!(cached.hourly.time.len(), 24);
    }
}
