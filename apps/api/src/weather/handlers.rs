use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, AppJson};
use crate::models::{NewWeatherHistoryEntry, WeatherHistoryEntry};
use crate::state::AppState;
use crate::store::WeatherState;
use crate::validation::{validate_weather_history, WeatherHistoryForm};
use crate::views::analytics::AnalyticsPeriod;
use crate::views::weather::{history_window, weather_advice, WeatherHistoryWindow};

#[derive(Serialize)]
pub struct WeatherResponse {
    #[serde(flatten)]
    pub weather: WeatherState,
    /// Empty until a reading exists.
    pub advice: Vec<String>,
}

impl From<WeatherState> for WeatherResponse {
    fn from(weather: WeatherState) -> Self {
        let advice = weather
            .current
            .as_ref()
            .map(|current| weather_advice(current, &weather.forecast))
            .unwrap_or_default();
        WeatherResponse { weather, advice }
    }
}

/// GET /api/v1/weather
pub async fn handle_get_weather(State(state): State<AppState>) -> Json<WeatherResponse> {
    let weather = state.store.read().await.weather().clone();
    Json(WeatherResponse::from(weather))
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Also append the new reading to the weather log.
    #[serde(default)]
    pub record: bool,
}

/// POST /api/v1/weather/refresh
/// Fetches current conditions, forecast and place name concurrently without
/// holding the store lock, then applies them in one write.
pub async fn handle_refresh_weather(
    State(state): State<AppState>,
    Query(params): Query<RefreshQuery>,
) -> Json<WeatherResponse> {
    let lat = params.lat.unwrap_or(state.config.default_lat);
    let lon = params.lon.unwrap_or(state.config.default_lon);

    state.store.write().await.set_weather_loading(true);

    let provider = state.weather.as_ref();
    let (snapshot, forecast, location_name) = tokio::join!(
        provider.current_weather(lat, lon),
        provider.forecast(lat, lon),
        provider.location_name(lat, lon),
    );
    info!(
        "Weather refreshed for ({lat}, {lon}): {} from {}",
        snapshot.condition, snapshot.data_source
    );

    let mut store = state.store.write().await;
    if params.record {
        store.add_weather_history_entry(NewWeatherHistoryEntry::from_snapshot(&snapshot));
    }
    store.apply_weather_fetch(snapshot, forecast, location_name);
    Json(WeatherResponse::from(store.weather().clone()))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<AnalyticsPeriod>,
}

/// GET /api/v1/weather/history
/// Defaults to the last 7 days.
pub async fn handle_weather_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Json<WeatherHistoryWindow> {
    let store = state.store.read().await;
    Json(history_window(
        store.weather_history(),
        params.period.unwrap_or(AnalyticsPeriod::Week),
        chrono::Utc::now(),
    ))
}

/// POST /api/v1/weather/history
pub async fn handle_add_weather_history(
    State(state): State<AppState>,
    AppJson(form): AppJson<WeatherHistoryForm>,
) -> Result<(StatusCode, Json<WeatherHistoryEntry>), AppError> {
    let data = validate_weather_history(form)?;
    let entry = state.store.write().await.add_weather_history_entry(data);
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/v1/weather/history
pub async fn handle_clear_weather_history(State(state): State<AppState>) -> StatusCode {
    state.store.write().await.clear_weather_history();
    StatusCode::NO_CONTENT
}
