use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::PlantedItem;

pub const TOP_PLANTS_LIMIT: usize = 5;

/// Per-plant scores shown on the analytics page, all percentages except
/// `tasks_completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantPerformance {
    pub plant_id: String,
    pub name: String,
    pub growth_rate: i64,
    pub health: i64,
    pub water_efficiency: i64,
    pub tasks_completed: i64,
}

impl PlantPerformance {
    pub fn score(&self) -> f64 {
        (self.growth_rate + self.health) as f64 / 2.0
    }
}

/// Highest mean of growth rate and health first; equal scores keep their
/// input order.
pub fn top_performing_plants(
    mut performance: Vec<PlantPerformance>,
    limit: usize,
) -> Vec<PlantPerformance> {
    performance.sort_by(|a, b| b.score().total_cmp(&a.score()));
    performance.truncate(limit);
    performance
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub label: String,
    pub count: usize,
    /// Fraction of the total in `[0, 1]`.
    pub share: f64,
}

pub fn distribution_by_name(plants: &[&PlantedItem]) -> Vec<DistributionBucket> {
    distribution(plants.iter().map(|p| p.name.as_str()))
}

pub fn distribution_by_species(plants: &[&PlantedItem]) -> Vec<DistributionBucket> {
    distribution(plants.iter().map(|p| p.species.as_str()))
}

/// Buckets in first-seen order.
fn distribution<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<DistributionBucket> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for label in labels {
        total += 1;
        let count = counts.entry(label).or_insert(0);
        if *count == 0 {
            order.push(label);
        }
        *count += 1;
    }

    order
        .into_iter()
        .map(|label| {
            let count = counts.get(label).copied().unwrap_or(0);
            DistributionBucket {
                label: label.to_string(),
                count,
                share: count as f64 / total as f64,
            }
        })
        .collect()
}
