use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::events::{Collection, StoreEvent};
use super::{new_id, EntityKind, GardenStore, StoreError};
use crate::models::{BedUpdate, GardenBed, NewBed, NewPlant, PlantUpdate, PlantedItem};

/// Outcome of deleting a bed: its plants are removed with it, its tasks are
/// kept but detached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedRemoval {
    pub bed: GardenBed,
    pub removed_plant_ids: Vec<String>,
    pub orphaned_task_ids: Vec<String>,
}

impl GardenStore {
    pub fn add_bed(&mut self, data: NewBed) -> GardenBed {
        let bed = GardenBed::from_new(new_id(), data, Utc::now());
        self.beds.push(bed.clone());
        debug!("Added bed {} ({})", bed.id, bed.name);
        self.commit(StoreEvent::added(Collection::Beds, &bed.id));
        bed
    }

    pub fn update_bed(&mut self, id: &str, update: BedUpdate) -> Result<GardenBed, StoreError> {
        let bed = self
            .beds
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Bed, id))?;
        bed.apply(update);
        let updated = bed.clone();
        self.commit(StoreEvent::updated(Collection::Beds, id));
        Ok(updated)
    }

    pub fn delete_bed(&mut self, id: &str) -> Result<BedRemoval, StoreError> {
        let index = self
            .beds
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Bed, id))?;
        let bed = self.beds.remove(index);

        let removed_plant_ids: Vec<String> = self
            .plants
            .iter()
            .filter(|p| p.bed_id == id)
            .map(|p| p.id.clone())
            .collect();
        self.plants.retain(|p| p.bed_id != id);

        let mut orphaned_task_ids = Vec::new();
        for task in self
            .tasks
            .iter_mut()
            .filter(|t| t.bed_id.as_deref() == Some(id))
        {
            task.bed_id = None;
            orphaned_task_ids.push(task.id.clone());
        }

        info!(
            "Deleted bed {id}: removed {} plants, detached {} tasks",
            removed_plant_ids.len(),
            orphaned_task_ids.len()
        );
        self.commit(StoreEvent::deleted(Collection::Beds, id));

        Ok(BedRemoval {
            bed,
            removed_plant_ids,
            orphaned_task_ids,
        })
    }

    /// Adds a plant to an existing bed and appends it to that bed's item list.
    pub fn add_plant(&mut self, data: NewPlant) -> Result<PlantedItem, StoreError> {
        let bed = self
            .beds
            .iter_mut()
            .find(|b| b.id == data.bed_id)
            .ok_or_else(|| StoreError::MissingBed(data.bed_id.clone()))?;

        let plant = PlantedItem::from_new(new_id(), data, Utc::now());
        bed.planted_item_ids.push(plant.id.clone());
        self.plants.push(plant.clone());
        debug!("Added plant {} to bed {}", plant.id, plant.bed_id);
        self.commit(StoreEvent::added(Collection::Plants, &plant.id));
        Ok(plant)
    }

    /// Merges `update` into the plant. A new `bed_id` moves the plant: the
    /// target bed must exist, and both beds' item lists are adjusted.
    pub fn update_plant(
        &mut self,
        id: &str,
        mut update: PlantUpdate,
    ) -> Result<PlantedItem, StoreError> {
        let index = self
            .plants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Plant, id))?;

        if let Some(target) = update.bed_id.take() {
            let current = self.plants[index].bed_id.clone();
            if target != current {
                if self.bed(&target).is_none() {
                    return Err(StoreError::MissingBed(target));
                }
                if let Some(old) = self.beds.iter_mut().find(|b| b.id == current) {
                    old.planted_item_ids.retain(|p| p != id);
                }
                if let Some(new) = self.beds.iter_mut().find(|b| b.id == target) {
                    new.planted_item_ids.push(id.to_string());
                }
                debug!("Moved plant {id} from bed {current} to bed {target}");
                self.plants[index].bed_id = target;
            }
        }

        self.plants[index].apply(update);
        let updated = self.plants[index].clone();
        self.commit(StoreEvent::updated(Collection::Plants, id));
        Ok(updated)
    }

    pub fn delete_plant(&mut self, id: &str) -> Result<PlantedItem, StoreError> {
        let index = self
            .plants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Plant, id))?;
        let plant = self.plants.remove(index);

        if let Some(bed) = self.beds.iter_mut().find(|b| b.id == plant.bed_id) {
            bed.planted_item_ids.retain(|p| p != id);
        }
        self.commit(StoreEvent::deleted(Collection::Plants, id));
        Ok(plant)
    }
}
