use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use super::{ConditionBlock, DEMO_SOURCE, FORECAST_DAYS};
use crate::models::{DailyForecast, WeatherSnapshot};
use crate::views::sampling::SampleRng;

const DEMO_CONDITIONS: [&str; 4] = ["Clear", "Clouds", "Rain", "Sunny"];

/// One 3-hourly entry of the `/forecast` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
    /// Probability of precipitation in `[0, 1]`.
    #[serde(default)]
    pub pop: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMain {
    pub temp_max: f64,
    pub temp_min: f64,
}

struct DayAccumulator {
    day: NaiveDate,
    first_seen: DateTime<Utc>,
    condition: String,
    high: f64,
    low: f64,
    pop: f64,
}

/// Collapses 3-hourly entries into one forecast per UTC calendar day, in
/// first-seen order: highest high, lowest low, highest precipitation
/// probability. Date and condition come from the day's first entry.
pub fn group_forecast_by_day(items: &[ForecastItem], max_days: usize) -> Vec<DailyForecast> {
    let mut days: Vec<DayAccumulator> = Vec::new();

    for item in items {
        let Some(at) = Utc.timestamp_opt(item.dt, 0).single() else {
            continue;
        };
        let day = at.date_naive();
        match days.iter_mut().find(|d| d.day == day) {
            Some(acc) => {
                acc.high = acc.high.max(item.main.temp_max);
                acc.low = acc.low.min(item.main.temp_min);
                acc.pop = acc.pop.max(item.pop);
            }
            None => days.push(DayAccumulator {
                day,
                first_seen: at,
                condition: item
                    .weather
                    .first()
                    .map(|c| c.main.clone())
                    .unwrap_or_default(),
                high: item.main.temp_max,
                low: item.main.temp_min,
                pop: item.pop.max(0.0),
            }),
        }
    }

    days.into_iter()
        .take(max_days)
        .enumerate()
        .map(|(index, acc)| DailyForecast {
            id: format!("forecast-{index}"),
            date: acc.first_seen,
            high_temp: acc.high,
            low_temp: acc.low,
            condition: acc.condition,
            precipitation: acc.pop * 100.0,
        })
        .collect()
}

pub fn demo_weather(now: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: 22.0,
        condition: "Clear".to_string(),
        high_temp: Some(25.0),
        low_temp: Some(18.0),
        humidity: Some(65.0),
        wind_speed: Some(5.0),
        visibility: None,
        feels_like: None,
        data_source: DEMO_SOURCE.to_string(),
        is_real_data: false,
        timestamp: now,
    }
}

/// Four whole-number days starting at `now`: highs in `[20, 30)`, lows in
/// `[10, 20)`, precipitation in `[0, 30)`.
pub fn demo_forecast(rng: &mut SampleRng, now: DateTime<Utc>) -> Vec<DailyForecast> {
    (0..FORECAST_DAYS)
        .map(|index| DailyForecast {
            id: format!("demo-forecast-{index}"),
            date: now + Duration::days(index as i64),
            high_temp: rng.range(20.0, 30.0).floor(),
            low_temp: rng.range(10.0, 20.0).floor(),
            condition: rng
                .pick(&DEMO_CONDITIONS)
                .copied()
                .unwrap_or(DEMO_CONDITIONS[0])
                .to_string(),
            precipitation: rng.range(0.0, 30.0).floor(),
        })
        .collect()
}
