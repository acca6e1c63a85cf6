//! The garden store: single source of truth for every domain collection.
//!
//! One `GardenStore` value is created at startup and injected into the
//! application state behind a lock. All mutations are synchronous methods; each
//! successful one persists the durable subset (when it changed) and broadcasts
//! exactly one `StoreEvent` to subscribers.

#![allow(dead_code)]

pub mod budget;
pub mod events;
pub mod garden;
pub mod handlers;
pub mod persistence;
pub mod tasks;
pub mod weather;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{
    BudgetTransaction, DailyForecast, GardenBed, GardenTask, PlantedItem, WeatherHistoryEntry,
    WeatherSnapshot,
};
use events::{StoreEvent, EVENT_CHANNEL_CAPACITY};
use persistence::{encode_state, load_state, PersistedState, PersistedView, StateStorage};

pub use garden::BedRemoval;

/// The store as shared across request handlers.
pub type SharedStore = Arc<RwLock<GardenStore>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Bed,
    Plant,
    Task,
    Transaction,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Bed => "Bed",
            EntityKind::Plant => "Plant",
            EntityKind::Task => "Task",
            EntityKind::Transaction => "Transaction",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("Bed {0} does not exist")]
    MissingBed(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Live weather fields. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherState {
    pub current: Option<WeatherSnapshot>,
    pub forecast: Vec<DailyForecast>,
    pub location_name: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct GardenStore {
    beds: Vec<GardenBed>,
    plants: Vec<PlantedItem>,
    tasks: Vec<GardenTask>,
    transactions: Vec<BudgetTransaction>,
    is_premium: bool,
    weather_history: Vec<WeatherHistoryEntry>,
    weather: WeatherState,
    storage: Arc<dyn StateStorage>,
    events: broadcast::Sender<StoreEvent>,
    save_error: Option<String>,
}

impl GardenStore {
    /// Creates a store rehydrated from `storage`. A missing or unreadable blob
    /// yields empty collections.
    pub fn open(storage: Arc<dyn StateStorage>) -> Self {
        let state = load_state(storage.as_ref());
        info!(
            "Garden store loaded: {} beds, {} plants, {} tasks, {} transactions",
            state.beds.len(),
            state.plants.len(),
            state.tasks.len(),
            state.budget_transactions.len()
        );
        Self::from_state(state, storage)
    }

    fn from_state(state: PersistedState, storage: Arc<dyn StateStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        GardenStore {
            beds: state.beds,
            plants: state.plants,
            tasks: state.tasks,
            transactions: state.budget_transactions,
            is_premium: state.is_premium,
            weather_history: state.weather_history,
            weather: WeatherState::default(),
            storage,
            events,
            save_error: None,
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ── Read accessors ──────────────────────────────────────────────────────

    pub fn beds(&self) -> &[GardenBed] {
        &self.beds
    }

    pub fn bed(&self, id: &str) -> Option<&GardenBed> {
        self.beds.iter().find(|b| b.id == id)
    }

    pub fn plants(&self) -> &[PlantedItem] {
        &self.plants
    }

    pub fn plant(&self, id: &str) -> Option<&PlantedItem> {
        self.plants.iter().find(|p| p.id == id)
    }

    pub fn tasks(&self) -> &[GardenTask] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&GardenTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn transactions(&self) -> &[BudgetTransaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: &str) -> Option<&BudgetTransaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    pub fn weather(&self) -> &WeatherState {
        &self.weather
    }

    /// Newest first.
    pub fn weather_history(&self) -> &[WeatherHistoryEntry] {
        &self.weather_history
    }

    /// The most recent failed save, cleared once a later save succeeds.
    pub fn last_save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    /// Owned copy of the persisted subset.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            beds: self.beds.clone(),
            plants: self.plants.clone(),
            tasks: self.tasks.clone(),
            budget_transactions: self.transactions.clone(),
            is_premium: self.is_premium,
            weather_history: self.weather_history.clone(),
        }
    }

    // ── Whole-store mutations ───────────────────────────────────────────────

    pub fn set_premium_status(&mut self, is_premium: bool) {
        self.is_premium = is_premium;
        info!("Premium status set to {is_premium}");
        self.commit(StoreEvent::PremiumChanged { is_premium });
    }

    /// Empties every collection, resets the premium flag and removes the
    /// stored blob.
    pub fn clear_all(&mut self) {
        self.beds.clear();
        self.plants.clear();
        self.tasks.clear();
        self.transactions.clear();
        self.weather_history.clear();
        self.is_premium = false;
        self.weather = WeatherState::default();

        match self.storage.clear() {
            Ok(()) => self.save_error = None,
            Err(e) => {
                error!("Failed to clear saved garden state: {e}");
                self.save_error = Some(e.to_string());
            }
        }
        info!("All garden data cleared");
        self.notify(StoreEvent::Reset);
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Persists the durable subset, then notifies subscribers.
    fn commit(&mut self, event: StoreEvent) {
        self.persist();
        self.notify(event);
    }

    fn notify(&self, event: StoreEvent) {
        // No receivers is fine; presentation may not be listening.
        let _ = self.events.send(event);
    }

    fn persist(&mut self) {
        let view = PersistedView {
            beds: &self.beds,
            plants: &self.plants,
            tasks: &self.tasks,
            budget_transactions: &self.transactions,
            is_premium: self.is_premium,
            weather_history: &self.weather_history,
        };
        let result = encode_state(&view).and_then(|blob| self.storage.save(&blob));

        match result {
            Ok(()) => {
                if self.save_error.take().is_some() {
                    info!("Garden state saved again after an earlier failure");
                }
            }
            Err(e) => {
                // Report once per outage; the in-memory store stays authoritative.
                if self.save_error.is_none() {
                    error!("Failed to save garden state: {e}");
                }
                self.save_error = Some(e.to_string());
            }
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
