use serde::Serialize;

/// Buffered events per subscriber before slow receivers start lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Beds,
    Plants,
    Tasks,
    Transactions,
    WeatherHistory,
}

/// Change notification broadcast after every successful store mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    Added { collection: Collection, id: String },
    Updated { collection: Collection, id: String },
    Deleted { collection: Collection, id: String },
    PremiumChanged { is_premium: bool },
    WeatherChanged,
    WeatherHistoryCleared,
    Reset,
}

impl StoreEvent {
    pub fn added(collection: Collection, id: &str) -> Self {
        StoreEvent::Added {
            collection,
            id: id.to_string(),
        }
    }

    pub fn updated(collection: Collection, id: &str) -> Self {
        StoreEvent::Updated {
            collection,
            id: id.to_string(),
        }
    }

    pub fn deleted(collection: Collection, id: &str) -> Self {
        StoreEvent::Deleted {
            collection,
            id: id.to_string(),
        }
    }
}
