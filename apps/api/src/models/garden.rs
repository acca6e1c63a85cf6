use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, located growing area. `planted_item_ids` is maintained by the store
/// and always lists the plants whose `bed_id` points here, in planting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenBed {
    pub id: String,
    pub name: String,
    pub location: String,
    pub area: f64,
    pub description: String,
    pub planted_item_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBed {
    pub name: String,
    pub location: String,
    pub area: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub area: Option<f64>,
    pub description: Option<String>,
}

impl GardenBed {
    pub fn from_new(id: String, data: NewBed, created_at: DateTime<Utc>) -> Self {
        GardenBed {
            id,
            name: data.name,
            location: data.location,
            area: data.area,
            description: data.description,
            planted_item_ids: Vec::new(),
            created_at,
        }
    }

    pub fn apply(&mut self, update: BedUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(area) = update.area {
            self.area = area;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
}

/// A single plant placed in a bed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantedItem {
    pub id: String,
    pub name: String,
    /// Species or variety, shown as "type" in the garden UI.
    pub species: String,
    pub bed_id: String,
    pub planted_date: DateTime<Utc>,
    pub expected_harvest_date: Option<DateTime<Utc>>,
    pub health: HealthStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlant {
    pub name: String,
    pub species: String,
    pub bed_id: String,
    pub planted_date: DateTime<Utc>,
    pub expected_harvest_date: Option<DateTime<Utc>>,
    pub health: HealthStatus,
    pub notes: String,
}

/// Partial plant update. `expected_harvest_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantUpdate {
    pub name: Option<String>,
    pub species: Option<String>,
    pub bed_id: Option<String>,
    pub planted_date: Option<DateTime<Utc>>,
    pub expected_harvest_date: Option<Option<DateTime<Utc>>>,
    pub health: Option<HealthStatus>,
    pub notes: Option<String>,
}

impl PlantedItem {
    pub fn from_new(id: String, data: NewPlant, created_at: DateTime<Utc>) -> Self {
        PlantedItem {
            id,
            name: data.name,
            species: data.species,
            bed_id: data.bed_id,
            planted_date: data.planted_date,
            expected_harvest_date: data.expected_harvest_date,
            health: data.health,
            notes: data.notes,
            created_at,
        }
    }

    /// Merges everything except `bed_id`; moving between beds is the store's job.
    pub fn apply(&mut self, update: PlantUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(species) = update.species {
            self.species = species;
        }
        if let Some(planted_date) = update.planted_date {
            self.planted_date = planted_date;
        }
        if let Some(harvest) = update.expected_harvest_date {
            self.expected_harvest_date = harvest;
        }
        if let Some(health) = update.health {
            self.health = health;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}
