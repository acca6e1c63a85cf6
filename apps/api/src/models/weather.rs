use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The most recent weather reading. Replaced on every fetch, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub condition: String,
    pub high_temp: Option<f64>,
    pub low_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub visibility: Option<f64>,
    pub feels_like: Option<f64>,
    pub data_source: String,
    pub is_real_data: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub id: String,
    pub date: DateTime<Utc>,
    pub high_temp: f64,
    pub low_temp: f64,
    pub condition: String,
    /// Probability of precipitation, in percent.
    pub precipitation: f64,
}

/// One line of the weather log. The log is append-only and kept newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherHistoryEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub temperature: f64,
    pub condition: String,
    pub high_temp: Option<f64>,
    pub low_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub data_source: String,
    pub is_historical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWeatherHistoryEntry {
    pub date: DateTime<Utc>,
    pub temperature: f64,
    pub condition: String,
    pub high_temp: Option<f64>,
    pub low_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub data_source: String,
    pub is_historical: bool,
}

impl WeatherHistoryEntry {
    pub fn from_new(id: String, data: NewWeatherHistoryEntry) -> Self {
        WeatherHistoryEntry {
            id,
            date: data.date,
            temperature: data.temperature,
            condition: data.condition,
            high_temp: data.high_temp,
            low_temp: data.low_temp,
            humidity: data.humidity,
            wind_speed: data.wind_speed,
            precipitation: data.precipitation,
            data_source: data.data_source,
            is_historical: data.is_historical,
        }
    }
}

impl NewWeatherHistoryEntry {
    /// Log line for a freshly fetched snapshot.
    pub fn from_snapshot(snapshot: &WeatherSnapshot) -> Self {
        NewWeatherHistoryEntry {
            date: snapshot.timestamp,
            temperature: snapshot.temperature,
            condition: snapshot.condition.clone(),
            high_temp: snapshot.high_temp,
            low_temp: snapshot.low_temp,
            humidity: snapshot.humidity,
            wind_speed: snapshot.wind_speed,
            precipitation: None,
            data_source: snapshot.data_source.clone(),
            is_historical: false,
        }
    }
}
