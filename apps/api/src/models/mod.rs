pub mod budget;
pub mod garden;
pub mod task;
pub mod weather;

pub use budget::{BudgetTransaction, NewTransaction, TransactionKind, TransactionUpdate};
pub use garden::{BedUpdate, GardenBed, HealthStatus, NewBed, NewPlant, PlantUpdate, PlantedItem};
pub use task::{GardenTask, NewTask, TaskCategory, TaskPriority, TaskStatus, TaskUpdate};
pub use weather::{DailyForecast, NewWeatherHistoryEntry, WeatherHistoryEntry, WeatherSnapshot};
