use std::sync::Arc;

use crate::config::Config;
use crate::store::SharedStore;
use crate::views::analytics::AnalyticsSource;
use crate::weather::WeatherProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Pluggable weather source. Default: OpenWeatherClient with demo fallback.
    pub weather: Arc<dyn WeatherProvider>,
    /// Pluggable analytics series. Default: SampledAnalytics.
    pub analytics: Arc<dyn AnalyticsSource>,
    pub config: Config,
}
