mod config;
mod errors;
mod models;
mod routes;
mod state;
mod store;
mod validation;
mod views;
mod weather;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::persistence::{JsonFileStorage, MemoryStorage, StateStorage};
use crate::store::{GardenStore, SharedStore};
use crate::views::analytics::SampledAnalytics;
use crate::weather::OpenWeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DreamGarden API v{}", env!("CARGO_PKG_VERSION"));

    // Durable storage: JSON file by default, memory only when DATA_FILE is empty
    let storage: Arc<dyn StateStorage> = match &config.data_file {
        Some(path) => {
            let file = JsonFileStorage::new(path.clone());
            info!("Garden state file: {}", file.path().display());
            Arc::new(file)
        }
        None => {
            warn!("DATA_FILE is empty; garden state will not survive a restart");
            Arc::new(MemoryStorage::new())
        }
    };
    let store = GardenStore::open(storage).into_shared();
    spawn_event_logger(&store).await;

    let weather = OpenWeatherClient::new(config.weather_client_config())?;
    if weather.has_api_key() {
        info!("Weather client initialized (OpenWeatherMap)");
    } else {
        warn!("WEATHER_API_KEY not set; weather endpoints will serve demo data");
    }

    let analytics = Arc::new(SampledAnalytics::new(config.analytics_seed));

    let state = AppState {
        store,
        weather: Arc::new(weather),
        analytics,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Logs every store change notification at debug level.
async fn spawn_event_logger(store: &SharedStore) {
    let mut events = store.read().await.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!(?event, "store changed"),
                Err(RecvError::Lagged(skipped)) => warn!("Store event logger skipped {skipped} events"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
