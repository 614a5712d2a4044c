use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub weather_api_url: String,
    pub port: u16,
    pub cache_max_size: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config {
            weather_api_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://api.open-meteo.com/v1/forecast".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a number"))?,
            cache_max_size: env::var("CACHE_MAX_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CACHE_MAX_SIZE must be a number"))?,
        };
        anyhow::ensure!(config.cache_max_size > 0, "CACHE_MAX_SIZE must be positive");
        Ok(config)
    }
}
