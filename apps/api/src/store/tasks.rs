use chrono::Utc;
use tracing::debug;

use super::events::{Collection, StoreEvent};
use super::{new_id, EntityKind, GardenStore, StoreError};
use crate::models::{GardenTask, NewTask, TaskUpdate};

impl GardenStore {
    /// Adds a task. A `bed_id`, when given, must name an existing bed.
    pub fn add_task(&mut self, data: NewTask) -> Result<GardenTask, StoreError> {
        if let Some(bed_id) = &data.bed_id {
            if self.bed(bed_id).is_none() {
                return Err(StoreError::MissingBed(bed_id.clone()));
            }
        }

        let task = GardenTask::from_new(new_id(), data, Utc::now());
        self.tasks.push(task.clone());
        debug!("Added task {} ({})", task.id, task.title);
        self.commit(StoreEvent::added(Collection::Tasks, &task.id));
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<GardenTask, StoreError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))?;

        if let Some(Some(bed_id)) = &update.bed_id {
            if self.bed(bed_id).is_none() {
                return Err(StoreError::MissingBed(bed_id.clone()));
            }
        }

        self.tasks[index].apply(update);
        let updated = self.tasks[index].clone();
        self.commit(StoreEvent::updated(Collection::Tasks, id));
        Ok(updated)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<GardenTask, StoreError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))?;
        let task = self.tasks.remove(index);
        self.commit(StoreEvent::deleted(Collection::Tasks, id));
        Ok(task)
    }

    /// Flips completion: completed tasks go back to pending, anything else
    /// becomes completed.
    pub fn toggle_task_complete(&mut self, id: &str) -> Result<GardenTask, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))?;
        task.status = task.status.toggled();
        let toggled = task.clone();
        self.commit(StoreEvent::updated(Collection::Tasks, id));
        Ok(toggled)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::models::{NewBed, NewTask, TaskCategory, TaskPriority, TaskStatus, TaskUpdate};
    use crate::store::test_support::memory_store;
    use crate::store::StoreError;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "Check the soil first".to_string(),
            due_date: Utc::now(),
            priority: TaskPriority::High,
            category: TaskCategory::Fertilizing,
            status: TaskStatus::Pending,
            bed_id: None,
        }
    }

    #[test]
    fn test_toggle_twice_restores_pending() {
        let (mut store, _) = memory_store();
        let task = store.add_task(new_task("Feed roses")).unwrap();

        assert!(store.toggle_task_complete(&task.id).unwrap().is_completed());
        let back = store.toggle_task_complete(&task.id).unwrap();
        assert_eq!(back.status, TaskStatus::Pending);
    }

    #[test]
    fn test_toggle_in_progress_completes() {
        let (mut store, _) = memory_store();
        let mut data = new_task("Prune");
        data.status = TaskStatus::InProgress;
        let task = store.add_task(data).unwrap();
        assert_eq!(
            store.toggle_task_complete(&task.id).unwrap().status,
            TaskStatus::Completed
        );
    }

    #[test]
    fn test_toggle_missing_task_is_reported() {
        let (mut store, _) = memory_store();
        assert!(matches!(
            store.toggle_task_complete("missing"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_task_bed_reference_must_exist() {
        let (mut store, _) = memory_store();
        let mut data = new_task("Water");
        data.bed_id = Some("ghost".to_string());
        assert_eq!(
            store.add_task(data).unwrap_err(),
            StoreError::MissingBed("ghost".to_string())
        );

        let task = store.add_task(new_task("Water")).unwrap();
        let err = store
            .update_task(
                &task.id,
                TaskUpdate {
                    bed_id: Some(Some("ghost".to_string())),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, StoreError::MissingBed("ghost".to_string()));
    }

    #[test]
    fn test_update_and_detach_task() {
        let (mut store, _) = memory_store();
        let bed = store.add_bed(NewBed {
            name: "Roses".to_string(),
            location: "Porch".to_string(),
            area: 1.5,
            description: String::new(),
        });
        let mut data = new_task("Feed roses");
        data.bed_id = Some(bed.id.clone());
        let task = store.add_task(data).unwrap();

        let updated = store
            .update_task(
                &task.id,
                TaskUpdate {
                    priority: Some(TaskPriority::Low),
                    bed_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.priority, TaskPriority::Low);
        assert_eq!(updated.bed_id, None);
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(updated.title, "Feed roses");

        store.delete_task(&task.id).unwrap();
        assert!(store.tasks().is_empty());
    }
}
