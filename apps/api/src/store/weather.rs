use tracing::debug;

use super::events::{Collection, StoreEvent};
use super::{new_id, GardenStore};
use crate::models::{DailyForecast, NewWeatherHistoryEntry, WeatherHistoryEntry, WeatherSnapshot};

impl GardenStore {
    pub fn set_current_weather(&mut self, snapshot: WeatherSnapshot) {
        self.weather.current = Some(snapshot);
        self.notify(StoreEvent::WeatherChanged);
    }

    pub fn set_forecast(&mut self, forecast: Vec<DailyForecast>) {
        self.weather.forecast = forecast;
        self.notify(StoreEvent::WeatherChanged);
    }

    pub fn set_location_name(&mut self, name: String) {
        self.weather.location_name = name;
        self.notify(StoreEvent::WeatherChanged);
    }

    pub fn set_weather_loading(&mut self, loading: bool) {
        self.weather.is_loading = loading;
        self.notify(StoreEvent::WeatherChanged);
    }

    pub fn set_weather_error(&mut self, error: Option<String>) {
        self.weather.error = error;
        self.notify(StoreEvent::WeatherChanged);
    }

    /// Applies the results of one provider round in a single mutation and
    /// clears the loading and error fields.
    pub fn apply_weather_fetch(
        &mut self,
        snapshot: WeatherSnapshot,
        forecast: Vec<DailyForecast>,
        location_name: String,
    ) {
        debug!(
            "Weather updated for {location_name} from {} ({} forecast days)",
            snapshot.data_source,
            forecast.len()
        );
        self.weather.current = Some(snapshot);
        self.weather.forecast = forecast;
        self.weather.location_name = location_name;
        self.weather.is_loading = false;
        self.weather.error = None;
        self.notify(StoreEvent::WeatherChanged);
    }

    /// Prepends to the weather log.
    pub fn add_weather_history_entry(
        &mut self,
        data: NewWeatherHistoryEntry,
    ) -> WeatherHistoryEntry {
        let entry = WeatherHistoryEntry::from_new(new_id(), data);
        self.weather_history.insert(0, entry.clone());
        self.commit(StoreEvent::added(Collection::WeatherHistory, &entry.id));
        entry
    }

    pub fn clear_weather_history(&mut self) {
        self.weather_history.clear();
        self.commit(StoreEvent::WeatherHistoryCleared);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::models::NewWeatherHistoryEntry;
    use crate::store::test_support::memory_store;
    use crate::store::GardenStore;

    fn entry(temperature: f64) -> NewWeatherHistoryEntry {
        NewWeatherHistoryEntry {
            date: Utc::now() - Duration::days(1),
            temperature,
            condition: "Rain".to_string(),
            high_temp: None,
            low_temp: None,
            humidity: Some(80.0),
            wind_speed: None,
            precipitation: Some(4.0),
            data_source: "Demo Data".to_string(),
            is_historical: true,
        }
    }

    #[test]
    fn test_history_is_newest_first_and_persisted() {
        let (mut store, storage) = memory_store();
        store.add_weather_history_entry(entry(10.0));
        let latest = store.add_weather_history_entry(entry(12.0));

        assert_eq!(store.weather_history()[0].id, latest.id);
        assert_eq!(store.weather_history()[1].temperature, 10.0);

        let reopened = GardenStore::open(storage.clone());
        assert_eq!(reopened.weather_history(), store.weather_history());

        store.clear_weather_history();
        assert!(GardenStore::open(storage).weather_history().is_empty());
    }

    #[test]
    fn test_weather_setters_replace_fields() {
        let (mut store, _) = memory_store();
        store.set_weather_loading(true);
        store.set_weather_error(Some("offline".to_string()));
        assert!(store.weather().is_loading);
        assert_eq!(store.weather().error.as_deref(), Some("offline"));

        store.set_weather_error(None);
        store.set_forecast(Vec::new());
        assert!(store.weather().error.is_none());
    }

    #[test]
    fn test_fetch_round_clears_loading_and_error() {
        let (mut store, storage) = memory_store();
        store.set_weather_loading(true);
        store.set_weather_error(Some("timeout".to_string()));

        let snapshot = crate::weather::forecast::demo_weather(Utc::now());
        store.apply_weather_fetch(snapshot.clone(), Vec::new(), "Sydney".to_string());

        let weather = store.weather();
        assert_eq!(weather.current.as_ref(), Some(&snapshot));
        assert_eq!(weather.location_name, "Sydney");
        assert!(!weather.is_loading);
        assert!(weather.error.is_none());
        assert!(storage.contents().is_none());
    }
}
