//! Selection and search filters shared by the list views.

use serde::Deserialize;

use crate::models::{BudgetTransaction, GardenBed, GardenTask, PlantedItem, TaskCategory, TaskStatus};

const ALL: &str = "all";

/// Which beds a view covers. `"all"` (or nothing) selects every bed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BedSelection {
    #[default]
    All,
    Bed(String),
}

impl BedSelection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some(ALL) => BedSelection::All,
            Some(id) => BedSelection::Bed(id.to_string()),
        }
    }

    pub fn includes(&self, bed_id: &str) -> bool {
        match self {
            BedSelection::All => true,
            BedSelection::Bed(id) => id == bed_id,
        }
    }

    /// Tasks without a bed only show up under "all".
    pub fn includes_optional(&self, bed_id: Option<&str>) -> bool {
        match bed_id {
            Some(id) => self.includes(id),
            None => *self == BedSelection::All,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == TaskStatus::Pending,
            StatusFilter::InProgress => status == TaskStatus::InProgress,
            StatusFilter::Completed => status == TaskStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(TaskCategory),
}

impl CategoryFilter {
    /// `None` for anything that is neither `"all"` nor a known category.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some(ALL) => Some(CategoryFilter::All),
            Some(other) => TaskCategory::parse(other).map(CategoryFilter::Only),
        }
    }

    pub fn matches(&self, category: TaskCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub bed: BedSelection,
    pub status: StatusFilter,
    pub category: CategoryFilter,
    pub search: Option<String>,
}

/// Case-insensitive substring match over any of `fields`. A blank query
/// matches everything.
fn matches_query(fields: &[&str], query: Option<&str>) -> bool {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };
    let needle = query.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

pub fn filter_tasks<'a>(tasks: &'a [GardenTask], filter: &TaskFilter) -> Vec<&'a GardenTask> {
    tasks
        .iter()
        .filter(|t| filter.bed.includes_optional(t.bed_id.as_deref()))
        .filter(|t| filter.status.matches(t.status))
        .filter(|t| filter.category.matches(t.category))
        .filter(|t| matches_query(&[t.title.as_str(), t.description.as_str()], filter.search.as_deref()))
        .collect()
}

pub fn search_beds<'a>(beds: &'a [GardenBed], query: Option<&str>) -> Vec<&'a GardenBed> {
    beds.iter()
        .filter(|b| matches_query(&[b.name.as_str(), b.location.as_str()], query))
        .collect()
}

pub fn search_plants<'a>(
    plants: &'a [PlantedItem],
    bed: &BedSelection,
    query: Option<&str>,
) -> Vec<&'a PlantedItem> {
    plants
        .iter()
        .filter(|p| bed.includes(&p.bed_id))
        .filter(|p| matches_query(&[p.name.as_str(), p.species.as_str()], query))
        .collect()
}

pub fn search_transactions<'a>(
    transactions: &'a [BudgetTransaction],
    query: Option<&str>,
) -> Vec<&'a BudgetTransaction> {
    transactions
        .iter()
        .filter(|t| matches_query(&[t.title.as_str(), t.category.as_str()], query))
        .collect()
}

/// Plants belonging to the selected beds, in store order.
pub fn plants_in_selection<'a>(
    plants: &'a [PlantedItem],
    bed: &BedSelection,
) -> Vec<&'a PlantedItem> {
    search_plants(plants, bed, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::{HealthStatus, NewPlant, NewTask, TaskPriority};

    fn task(title: &str, bed: Option<&str>, status: TaskStatus, category: TaskCategory) -> GardenTask {
        GardenTask::from_new(
            format!("id-{title}"),
            NewTask {
                title: title.to_string(),
                description: "routine".to_string(),
                due_date: Utc::now(),
                priority: TaskPriority::Medium,
                category,
                status,
                bed_id: bed.map(str::to_string),
            },
            Utc::now(),
        )
    }

    fn plant(name: &str, species: &str, bed: &str) -> PlantedItem {
        PlantedItem::from_new(
            format!("id-{name}"),
            NewPlant {
                name: name.to_string(),
                species: species.to_string(),
                bed_id: bed.to_string(),
                planted_date: Utc::now(),
                expected_harvest_date: None,
                health: HealthStatus::Good,
                notes: String::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_bed_selection_sentinel() {
        assert_eq!(BedSelection::parse(Some("all")), BedSelection::All);
        assert_eq!(BedSelection::parse(None), BedSelection::All);
        let one = BedSelection::parse(Some("bed-1"));
        assert!(one.includes("bed-1"));
        assert!(!one.includes("bed-2"));
        assert!(!one.includes_optional(None));
        assert!(BedSelection::All.includes_optional(None));
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::parse(Some("all")), Some(CategoryFilter::All));
        assert_eq!(
            CategoryFilter::parse(Some("pruning")),
            Some(CategoryFilter::Only(TaskCategory::Pruning))
        );
        assert_eq!(CategoryFilter::parse(Some("juggling")), None);
    }

    #[test]
    fn test_filter_tasks_combines_criteria() {
        let tasks = vec![
            task("Water roses", Some("b1"), TaskStatus::Pending, TaskCategory::Watering),
            task("Prune roses", Some("b1"), TaskStatus::Completed, TaskCategory::Pruning),
            task("Water lawn", None, TaskStatus::Pending, TaskCategory::Watering),
            task("Feed citrus", Some("b2"), TaskStatus::InProgress, TaskCategory::Fertilizing),
        ];

        let filter = TaskFilter {
            search: Some("WATER".to_string()),
            ..Default::default()
        };
        let titles: Vec<_> = filter_tasks(&tasks, &filter).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Water roses", "Water lawn"]);

        let filter = TaskFilter {
            bed: BedSelection::Bed("b1".to_string()),
            status: StatusFilter::Completed,
            ..Default::default()
        };
        let titles: Vec<_> = filter_tasks(&tasks, &filter).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Prune roses"]);

        let filter = TaskFilter {
            category: CategoryFilter::Only(TaskCategory::Fertilizing),
            ..Default::default()
        };
        assert_eq!(filter_tasks(&tasks, &filter).len(), 1);
    }

    #[test]
    fn test_search_plants_by_species_within_bed() {
        let plants = vec![
            plant("Sungold", "Tomato", "b1"),
            plant("Genovese", "Basil", "b1"),
            plant("Roma", "Tomato", "b2"),
        ];
        let hits = search_plants(&plants, &BedSelection::Bed("b1".to_string()), Some("tomato"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sungold");
        assert_eq!(plants_in_selection(&plants, &BedSelection::All).len(), 3);
    }
}
