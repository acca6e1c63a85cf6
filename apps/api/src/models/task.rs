use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Sort rank: high tasks come first.
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::High => 0,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Watering,
    Fertilizing,
    Pruning,
    Planting,
    Harvesting,
    General,
}

impl TaskCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "watering" => Some(TaskCategory::Watering),
            "fertilizing" => Some(TaskCategory::Fertilizing),
            "pruning" => Some(TaskCategory::Pruning),
            "planting" => Some(TaskCategory::Planting),
            "harvesting" => Some(TaskCategory::Harvesting),
            "general" => Some(TaskCategory::General),
            _ => None,
        }
    }
}

/// Single completion representation. Surfaces that only know "done / not done"
/// read `GardenTask::is_completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// completed -> pending, anything else -> completed.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Completed => TaskStatus::Pending,
            TaskStatus::Pending | TaskStatus::InProgress => TaskStatus::Completed,
        }
    }

    pub fn from_completed(completed: bool) -> Self {
        if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub bed_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub bed_id: Option<String>,
}

/// Partial task update. `bed_id: Some(None)` detaches the task from its bed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub status: Option<TaskStatus>,
    pub bed_id: Option<Option<String>>,
}

impl GardenTask {
    pub fn from_new(id: String, data: NewTask, created_at: DateTime<Utc>) -> Self {
        GardenTask {
            id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            priority: data.priority,
            category: data.category,
            status: data.status,
            bed_id: data.bed_id,
            created_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_date < now
    }

    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(bed_id) = update.bed_id {
            self.bed_id = bed_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycles_through_completed() {
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
    }

    #[test]
    fn test_priority_rank_orders_high_first() {
        assert!(TaskPriority::High.rank() < TaskPriority::Medium.rank());
        assert!(TaskPriority::Medium.rank() < TaskPriority::Low.rank());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TaskCategory::parse("pruning"), Some(TaskCategory::Pruning));
        assert_eq!(TaskCategory::parse("all"), None);
    }

    #[test]
    fn test_completed_task_is_never_overdue() {
        let now = Utc::now();
        let mut task = GardenTask::from_new(
            "t".to_string(),
            NewTask {
                title: "Water".to_string(),
                description: String::new(),
                due_date: now - chrono::Duration::days(1),
                priority: TaskPriority::Low,
                category: TaskCategory::Watering,
                status: TaskStatus::Pending,
                bed_id: None,
            },
            now,
        );
        assert!(task.is_overdue(now));
        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(now));
    }
}
