use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::weather::{WeatherClientConfig, DEFAULT_BASE_URL, DEFAULT_GEO_BASE_URL};

const DEFAULT_DATA_FILE: &str = "dreamgarden-storage.json";
// Sydney, used when the caller supplies no coordinates.
const DEFAULT_LAT: f64 = -33.8688;
const DEFAULT_LON: f64 = 151.2093;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` keeps garden state in memory only.
    pub data_file: Option<PathBuf>,
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub geo_base_url: String,
    pub default_lat: f64,
    pub default_lon: f64,
    pub analytics_seed: Option<u64>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_file = match lookup("DATA_FILE") {
            None => Some(PathBuf::from(DEFAULT_DATA_FILE)),
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
        };

        Ok(Config {
            data_file,
            weather_api_key: lookup("WEATHER_API_KEY").filter(|k| !k.trim().is_empty()),
            weather_base_url: lookup("WEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            geo_base_url: lookup("GEO_BASE_URL").unwrap_or_else(|| DEFAULT_GEO_BASE_URL.to_string()),
            default_lat: parse_or(&lookup, "DEFAULT_LAT", DEFAULT_LAT)?,
            default_lon: parse_or(&lookup, "DEFAULT_LON", DEFAULT_LON)?,
            analytics_seed: lookup("ANALYTICS_SEED")
                .map(|s| s.parse::<u64>())
                .transpose()
                .context("ANALYTICS_SEED must be an unsigned integer")?,
            port: parse_or(&lookup, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn weather_client_config(&self) -> WeatherClientConfig {
        WeatherClientConfig {
            api_key: self.weather_api_key.clone(),
            base_url: self.weather_base_url.trim_end_matches('/').to_string(),
            geo_base_url: self.geo_base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        None => Ok(default),
    }
}
