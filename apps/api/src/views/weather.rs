use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::analytics::AnalyticsPeriod;
use crate::models::{DailyForecast, WeatherHistoryEntry, WeatherSnapshot};

const FROST_BELOW: f64 = 5.0;
const HEAT_ABOVE: f64 = 30.0;
const WIND_ABOVE: f64 = 20.0;
const RAIN_LOOKAHEAD_DAYS: usize = 3;

pub const FAVORABLE_ADVICE: &str = "Weather conditions are favorable for gardening";

/// Gardening advice for the current reading and upcoming forecast. Always
/// returns at least one line.
pub fn weather_advice(current: &WeatherSnapshot, forecast: &[DailyForecast]) -> Vec<String> {
    let mut advice = Vec::new();

    if current.temperature < FROST_BELOW {
        advice.push("Protect sensitive plants from frost");
    }
    if current.temperature > HEAT_ABOVE {
        advice.push("Increase watering frequency for heat-sensitive plants");
    }
    if current.condition.to_lowercase().contains("rain") {
        advice.push("Reduce manual watering - nature is helping!");
    }
    if current.wind_speed.is_some_and(|w| w > WIND_ABOVE) {
        advice.push("Secure tall plants and protect from wind damage");
    }
    if forecast
        .iter()
        .take(RAIN_LOOKAHEAD_DAYS)
        .any(|day| day.precipitation > 0.0)
    {
        advice.push("Plan outdoor tasks around upcoming rain");
    }

    if advice.is_empty() {
        advice.push(FAVORABLE_ADVICE);
    }
    advice.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherHistoryWindow {
    pub period: AnalyticsPeriod,
    pub entries: Vec<WeatherHistoryEntry>,
    /// `None` when the window is empty.
    pub average_temperature: Option<f64>,
    pub total_precipitation: f64,
}

/// Log entries dated within the last `period` days of `now`, newest first.
pub fn history_window(
    history: &[WeatherHistoryEntry],
    period: AnalyticsPeriod,
    now: DateTime<Utc>,
) -> WeatherHistoryWindow {
    let since = now - Duration::days(i64::from(period.days()));
    let entries: Vec<WeatherHistoryEntry> = history
        .iter()
        .filter(|e| e.date >= since && e.date <= now)
        .cloned()
        .collect();

    let average_temperature = (!entries.is_empty())
        .then(|| entries.iter().map(|e| e.temperature).sum::<f64>() / entries.len() as f64);
    let total_precipitation: f64 = entries.iter().filter_map(|e| e.precipitation).sum();

    WeatherHistoryWindow {
        period,
        entries,
        average_temperature,
        total_precipitation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    fn snapshot(temperature: f64, condition: &str, wind: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature,
            condition: condition.to_string(),
            high_temp: None,
            low_temp: None,
            humidity: None,
            wind_speed: Some(wind),
            visibility: None,
            feels_like: None,
            data_source: "Demo Data".to_string(),
            is_real_data: false,
            timestamp: now(),
        }
    }

    fn day(offset: i64, precipitation: f64) -> DailyForecast {
        DailyForecast {
            id: format!("d{offset}"),
            date: now() + Duration::days(offset),
            high_temp: 24.0,
            low_temp: 14.0,
            condition: "Clouds".to_string(),
            precipitation,
        }
    }

    fn entry(days_ago: i64, temperature: f64, precipitation: Option<f64>) -> WeatherHistoryEntry {
        WeatherHistoryEntry {
            id: format!("h{days_ago}"),
            date: now() - Duration::days(days_ago),
            temperature,
            condition: "Clear".to_string(),
            high_temp: None,
            low_temp: None,
            humidity: None,
            wind_speed: None,
            precipitation,
            data_source: "Manual Entry".to_string(),
            is_historical: true,
        }
    }

    #[test]
    fn test_mild_day_is_favorable() {
        let advice = weather_advice(&snapshot(22.0, "Clear", 5.0), &[day(0, 0.0)]);
        assert_eq!(advice, vec![FAVORABLE_ADVICE.to_string()]);
    }

    #[test]
    fn test_each_rule_fires() {
        let frost = weather_advice(&snapshot(2.0, "Light Rain", 25.0), &[]);
        assert_eq!(frost.len(), 3);
        assert!(frost[0].contains("frost"));
        assert!(frost[1].contains("nature is helping"));
        assert!(frost[2].contains("wind"));

        let heat = weather_advice(&snapshot(34.0, "Clear", 5.0), &[]);
        assert_eq!(heat.len(), 1);
        assert!(heat[0].contains("heat-sensitive"));
    }

    #[test]
    fn test_rain_lookahead_is_three_days() {
        let forecast = vec![day(0, 0.0), day(1, 0.0), day(2, 0.0), day(3, 80.0)];
        let advice = weather_advice(&snapshot(20.0, "Clear", 5.0), &forecast);
        assert_eq!(advice, vec![FAVORABLE_ADVICE.to_string()]);

        let forecast = vec![day(0, 0.0), day(1, 10.0)];
        let advice = weather_advice(&snapshot(20.0, "Clear", 5.0), &forecast);
        assert!(advice[0].contains("upcoming rain"));
    }

    #[test]
    fn test_history_window_aggregates() {
        let history = vec![
            entry(1, 20.0, Some(2.0)),
            entry(3, 10.0, None),
            entry(6, 15.0, Some(4.5)),
            entry(20, 30.0, Some(50.0)),
        ];
        let window = history_window(&history, AnalyticsPeriod::Week, now());
        assert_eq!(window.entries.len(), 3);
        assert_eq!(window.average_temperature, Some(15.0));
        assert_eq!(window.total_precipitation, 6.5);

        let empty = history_window(&[], AnalyticsPeriod::Month, now());
        assert_eq!(empty.average_temperature, None);
        assert_eq!(empty.total_precipitation, 0.0);
    }
}
