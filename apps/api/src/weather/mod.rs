/// Weather provider: the single point of entry for OpenWeatherMap calls.
///
/// Every public operation is infallible. Missing credentials, transport
/// failures, error statuses and undecodable bodies are logged with `warn!`
/// and answered with demo values instead.
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{DailyForecast, WeatherSnapshot};
use crate::views::sampling::SampleRng;

pub mod forecast;
pub mod handlers;

use forecast::{demo_forecast, demo_weather, group_forecast_by_day, ForecastItem};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
pub const LIVE_SOURCE: &str = "OpenWeatherMap";
pub const DEMO_SOURCE: &str = "Demo Data";
pub const DEMO_LOCATION: &str = "Demo Location";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";
/// Days kept from the grouped forecast.
pub const FORECAST_DAYS: usize = 4;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 250;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no weather API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response is missing {0}")]
    Incomplete(&'static str),
}

/// Source of current conditions, forecasts and place names.
///
/// Carried in `AppState` as `Arc<dyn WeatherProvider>`.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, lat: f64, lon: f64) -> WeatherSnapshot;
    async fn forecast(&self, lat: f64, lon: f64) -> Vec<DailyForecast>;
    async fn location_name(&self, lat: f64, lon: f64) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// OpenWeatherMap wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: CurrentMain,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    wind: Option<WindBlock>,
    /// Metres.
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CurrentMain {
    temp: f64,
    temp_max: Option<f64>,
    temp_min: Option<f64>,
    humidity: Option<f64>,
    feels_like: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionBlock {
    pub main: String,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct GeoPlace {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl CurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot, WeatherError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|c| c.main)
            .ok_or(WeatherError::Incomplete("weather conditions"))?;
        Ok(WeatherSnapshot {
            temperature: self.main.temp,
            condition,
            high_temp: self.main.temp_max,
            low_temp: self.main.temp_min,
            humidity: self.main.humidity,
            wind_speed: self.wind.and_then(|w| w.speed),
            visibility: self.visibility.map(|m| m / 1000.0),
            feels_like: self.main.feels_like,
            data_source: LIVE_SOURCE.to_string(),
            is_real_data: true,
            timestamp: Utc::now(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WeatherClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub geo_base_url: String,
}

impl Default for WeatherClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
        }
    }
}

/// OpenWeatherMap-backed provider with one retry on 429, 5xx and transport
/// errors.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    config: WeatherClientConfig,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherClientConfig) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(WeatherError::MissingApiKey)
    }

    /// GETs `url` with the given query and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let mut last_error: Option<WeatherError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt));
                warn!(
                    "Weather request attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(url).query(query).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(WeatherError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(WeatherError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                return Err(WeatherError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            debug!("Weather request to {url} succeeded ({} bytes)", body.len());
            return Ok(serde_json::from_str(&body)?);
        }

        Err(last_error.unwrap_or(WeatherError::Incomplete("response")))
    }

    fn coordinates(&self, lat: f64, lon: f64, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", api_key.to_string()),
        ]
    }

    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, WeatherError> {
        let api_key = self.api_key()?;
        let mut query = self.coordinates(lat, lon, api_key);
        query.push(("units", "metric".to_string()));
        let url = format!("{}/weather", self.config.base_url);
        let response: CurrentResponse = self.get_json(&url, &query).await?;
        response.into_snapshot()
    }

    pub async fn fetch_forecast(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<DailyForecast>, WeatherError> {
        let api_key = self.api_key()?;
        let mut query = self.coordinates(lat, lon, api_key);
        query.push(("units", "metric".to_string()));
        let url = format!("{}/forecast", self.config.base_url);
        let response: ForecastResponse = self.get_json(&url, &query).await?;
        Ok(group_forecast_by_day(&response.list, FORECAST_DAYS))
    }

    pub async fn fetch_location_name(&self, lat: f64, lon: f64) -> Result<String, WeatherError> {
        let api_key = self.api_key()?;
        let mut query = self.coordinates(lat, lon, api_key);
        query.push(("limit", "1".to_string()));
        let url = format!("{}/reverse", self.config.geo_base_url);
        let places: Vec<GeoPlace> = self.get_json(&url, &query).await?;
        Ok(places
            .into_iter()
            .map(|p| p.name)
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, lat: f64, lon: f64) -> WeatherSnapshot {
        match self.fetch_current(lat, lon).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Current weather unavailable ({e}), using demo data");
                demo_weather(Utc::now())
            }
        }
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Vec<DailyForecast> {
        match self.fetch_forecast(lat, lon).await {
            Ok(days) => days,
            Err(e) => {
                warn!("Forecast unavailable ({e}), using demo forecast");
                demo_forecast(&mut SampleRng::from_entropy(), Utc::now())
            }
        }
    }

    async fn location_name(&self, lat: f64, lon: f64) -> String {
        match self.fetch_location_name(lat, lon).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Reverse geocoding unavailable ({e})");
                DEMO_LOCATION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    fn keyless() -> OpenWeatherClient {
        OpenWeatherClient::new(WeatherClientConfig::default()).unwrap()
    }

    fn client_for(base: &str) -> OpenWeatherClient {
        OpenWeatherClient::new(WeatherClientConfig {
            api_key: Some("test-key".to_string()),
            base_url: base.to_string(),
            geo_base_url: format!("{base}/geo"),
        })
        .unwrap()
    }

    /// Serves canned OpenWeatherMap responses on an ephemeral port. The first
    /// `/weather` call answers 503.
    async fn fake_api() -> String {
        async fn current(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Json<Value>) {
            if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"message": "busy"})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "main": {"temp": 17.5, "temp_max": 19.0, "temp_min": 15.0, "humidity": 80, "feels_like": 16.9},
                    "weather": [{"main": "Rain"}],
                    "wind": {"speed": 7.2},
                    "visibility": 8000
                })),
            )
        }

        async fn forecast() -> Json<Value> {
            // 2024-06-01T00:00Z and 2024-06-01T03:00Z, then 2024-06-02T00:00Z.
            Json(json!({
                "list": [
                    {"dt": 1717200000, "main": {"temp_max": 18.0, "temp_min": 12.0}, "weather": [{"main": "Clouds"}], "pop": 0.2},
                    {"dt": 1717210800, "main": {"temp_max": 21.0, "temp_min": 13.0}, "weather": [{"main": "Rain"}], "pop": 0.6},
                    {"dt": 1717286400, "main": {"temp_max": 24.0, "temp_min": 11.0}, "weather": [{"main": "Clear"}]}
                ]
            }))
        }

        async fn reverse() -> Json<Value> {
            Json(json!([{"name": "Sydney"}]))
        }

        let app = Router::new()
            .route("/weather", get(current))
            .route("/forecast", get(forecast))
            .route("/geo/reverse", get(reverse))
            .with_state(Arc::new(AtomicUsize::new(0)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_missing_key_returns_demo_data() {
        let client = keyless();
        assert!(!client.has_api_key());

        let snapshot = client.current_weather(-33.8688, 151.2093).await;
        assert!(!snapshot.is_real_data);
        assert_eq!(snapshot.data_source, DEMO_SOURCE);
        assert_eq!(snapshot.temperature, 22.0);

        assert_eq!(client.forecast(0.0, 0.0).await.len(), FORECAST_DAYS);
        assert_eq!(client.location_name(0.0, 0.0).await, DEMO_LOCATION);
        assert!(matches!(
            client.fetch_current(0.0, 0.0).await,
            Err(WeatherError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_empty_key_counts_as_missing() {
        let client = OpenWeatherClient::new(WeatherClientConfig {
            api_key: Some(String::new()),
            ..WeatherClientConfig::default()
        })
        .unwrap();
        assert!(!client.has_api_key());
        assert!(matches!(
            client.fetch_current(0.0, 0.0).await,
            Err(WeatherError::MissingApiKey)
        ));
        assert!(!client.current_weather(0.0, 0.0).await.is_real_data);
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        let client = client_for("http://127.0.0.1:9");
        let snapshot = client.current_weather(1.0, 2.0).await;
        assert_eq!(snapshot.data_source, DEMO_SOURCE);
        assert_eq!(client.location_name(1.0, 2.0).await, DEMO_LOCATION);
    }

    #[tokio::test]
    async fn test_live_responses_are_mapped_after_retry() {
        let base = fake_api().await;
        let client = client_for(&base);

        let snapshot = client.current_weather(-33.87, 151.21).await;
        assert!(snapshot.is_real_data);
        assert_eq!(snapshot.data_source, LIVE_SOURCE);
        assert_eq!(snapshot.condition, "Rain");
        assert_eq!(snapshot.wind_speed, Some(7.2));
        assert_eq!(snapshot.visibility, Some(8.0));

        let days = client.forecast(-33.87, 151.21).await;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].high_temp, 21.0);
        assert_eq!(days[0].low_temp, 12.0);
        assert_eq!(days[0].condition, "Clouds");
        assert!((days[0].precipitation - 60.0).abs() < 1e-9);
        assert_eq!(days[1].precipitation, 0.0);

        assert_eq!(client.location_name(-33.87, 151.21).await, "Sydney");
    }
}
