//! Analytics: per-day growth and task series plus per-plant scores.
//!
//! The series come from a pluggable `AnalyticsSource`. The default
//! `SampledAnalytics` synthesises bounded values, since no real sensor or
//! history feed exists yet. `AppState` holds an `Arc<dyn AnalyticsSource>`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ranking::{
    distribution_by_name, distribution_by_species, top_performing_plants, DistributionBucket,
    PlantPerformance, TOP_PLANTS_LIMIT,
};
use super::rates::{average_health, growth_rate, task_completion_rate, GrowthSample, TaskCompletionSample};
use super::round_half_up;
use super::sampling::SampleRng;
use crate::errors::AppError;
use crate::models::PlantedItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalyticsPeriod {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl AnalyticsPeriod {
    pub fn days(&self) -> u32 {
        match self {
            AnalyticsPeriod::Week => 7,
            AnalyticsPeriod::Month => 30,
            AnalyticsPeriod::Quarter => 90,
        }
    }

    /// Ascending dates ending at `today`, one per day of the period.
    pub fn dates(&self, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let days = i64::from(self.days());
        (0..days).map(move |i| today - Duration::days(days - i - 1))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn growth_samples(
        &self,
        period: AnalyticsPeriod,
        today: NaiveDate,
    ) -> Result<Vec<GrowthSample>, AppError>;

    async fn task_samples(
        &self,
        period: AnalyticsPeriod,
        today: NaiveDate,
    ) -> Result<Vec<TaskCompletionSample>, AppError>;

    async fn plant_performance(
        &self,
        plants: &[PlantedItem],
    ) -> Result<Vec<PlantPerformance>, AppError>;

    /// Name shown in reports, for transparency.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// SampledAnalytics: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Bounded synthetic series:
/// - height `10 + 0.5·i ± 1`, health `70 ± 10`, water level `60 ± 15`
/// - daily tasks: total in `[3, 7]`, completed `total × [0.6, 0.9)`
/// - plant scores: growth `[70, 100]`, health `[60, 100]`, water `[50, 100]`,
///   tasks `[5, 15]`
pub struct SampledAnalytics {
    rng: Mutex<SampleRng>,
}

impl SampledAnalytics {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SampleRng::seeded(seed),
            None => SampleRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut SampleRng) -> T) -> Result<T, AppError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("analytics sampler poisoned")))?;
        Ok(f(&mut rng))
    }

    fn sample_growth(&self, period: AnalyticsPeriod, today: NaiveDate) -> Result<Vec<GrowthSample>, AppError> {
        self.with_rng(|rng| {
            period
                .dates(today)
                .enumerate()
                .map(|(i, date)| GrowthSample {
                    date,
                    height: round_half_up(10.0 + i as f64 * 0.5 + rng.range(-1.0, 1.0)) as f64,
                    health: round_half_up(70.0 + rng.range(-10.0, 10.0)) as f64,
                    water_level: round_half_up(60.0 + rng.range(-15.0, 15.0)) as f64,
                })
                .collect()
        })
    }

    fn sample_tasks(
        &self,
        period: AnalyticsPeriod,
        today: NaiveDate,
    ) -> Result<Vec<TaskCompletionSample>, AppError> {
        self.with_rng(|rng| {
            period
                .dates(today)
                .map(|date| {
                    let total = round_half_up(rng.range(3.0, 7.0)).max(0) as u32;
                    let completed =
                        round_half_up(f64::from(total) * rng.range(0.6, 0.9)).max(0) as u32;
                    TaskCompletionSample {
                        date,
                        completed: completed.min(total),
                        total,
                    }
                })
                .collect()
        })
    }

    fn sample_performance(&self, plants: &[PlantedItem]) -> Result<Vec<PlantPerformance>, AppError> {
        self.with_rng(|rng| {
            plants
                .iter()
                .map(|plant| PlantPerformance {
                    plant_id: plant.id.clone(),
                    name: plant.name.clone(),
                    growth_rate: round_half_up(rng.range(70.0, 100.0)),
                    health: round_half_up(rng.range(60.0, 100.0)),
                    water_efficiency: round_half_up(rng.range(50.0, 100.0)),
                    tasks_completed: round_half_up(rng.range(5.0, 15.0)),
                })
                .collect()
        })
    }
}

#[async_trait]
impl AnalyticsSource for SampledAnalytics {
    async fn growth_samples(
        &self,
        period: AnalyticsPeriod,
        today: NaiveDate,
    ) -> Result<Vec<GrowthSample>, AppError> {
        self.sample_growth(period, today)
    }

    async fn task_samples(
        &self,
        period: AnalyticsPeriod,
        today: NaiveDate,
    ) -> Result<Vec<TaskCompletionSample>, AppError> {
        self.sample_tasks(period, today)
    }

    async fn plant_performance(
        &self,
        plants: &[PlantedItem],
    ) -> Result<Vec<PlantPerformance>, AppError> {
        self.sample_performance(plants)
    }

    fn backend(&self) -> &'static str {
        "sampled"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub period: AnalyticsPeriod,
    pub bed_id: Option<String>,
    pub growth: Vec<GrowthSample>,
    pub task_completion: Vec<TaskCompletionSample>,
    pub growth_rate: i64,
    pub average_health: i64,
    pub task_completion_rate: i64,
    pub top_plants: Vec<PlantPerformance>,
    pub name_distribution: Vec<DistributionBucket>,
    pub species_distribution: Vec<DistributionBucket>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub source_backend: String,
}

/// Gathers series from `source` and derives every analytics figure for the
/// given plant selection.
pub async fn build_report(
    source: &dyn AnalyticsSource,
    period: AnalyticsPeriod,
    bed_id: Option<String>,
    plants: &[PlantedItem],
    today: NaiveDate,
) -> Result<AnalyticsReport, AppError> {
    let growth = source.growth_samples(period, today).await?;
    let task_completion = source.task_samples(period, today).await?;
    let performance = source.plant_performance(plants).await?;

    let growth_rate = growth_rate(&growth);
    let average_health = average_health(&growth);
    let task_completion_rate = task_completion_rate(&task_completion);
    let plant_refs: Vec<&PlantedItem> = plants.iter().collect();

    Ok(AnalyticsReport {
        period,
        bed_id,
        insights: insights(growth_rate, average_health, task_completion_rate),
        recommendations: recommendations(growth_rate, average_health, task_completion_rate),
        growth,
        task_completion,
        growth_rate,
        average_health,
        task_completion_rate,
        top_plants: top_performing_plants(performance, TOP_PLANTS_LIMIT),
        name_distribution: distribution_by_name(&plant_refs),
        species_distribution: distribution_by_species(&plant_refs),
        source_backend: source.backend().to_string(),
    })
}

fn insights(growth_rate: i64, average_health: i64, completion_rate: i64) -> Vec<String> {
    let health_label = if average_health > 80 {
        "excellent condition"
    } else if average_health > 60 {
        "good condition"
    } else {
        "needs attention"
    };
    let care_label = if completion_rate > 80 {
        "consistent care"
    } else {
        "room for improvement"
    };
    vec![
        format!("Your garden is growing at {growth_rate}% rate over the selected period"),
        format!("Average plant health is {average_health}% - {health_label}"),
        format!("Task completion rate of {completion_rate}% shows {care_label}"),
    ]
}

fn recommendations(growth_rate: i64, average_health: i64, completion_rate: i64) -> Vec<String> {
    let mut out = Vec::new();
    if growth_rate < 10 {
        out.push("Consider adjusting watering schedule to improve growth rate".to_string());
    }
    if average_health < 70 {
        out.push("Some plants may need additional nutrients or care".to_string());
    }
    if completion_rate < 80 {
        out.push("Try to complete more tasks to maintain garden health".to_string());
    }
    out.push("Continue monitoring weather conditions for optimal care timing".to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::{HealthStatus, NewPlant};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn plant(name: &str) -> PlantedItem {
        PlantedItem::from_new(
            format!("p-{name}"),
            NewPlant {
                name: name.to_string(),
                species: "Herb".to_string(),
                bed_id: "b".to_string(),
                planted_date: Utc::now(),
                expected_harvest_date: None,
                health: HealthStatus::Good,
                notes: String::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_period_dates_end_today() {
        let dates: Vec<_> = AnalyticsPeriod::Week.dates(today()).collect();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 6, 24).unwrap());
        assert_eq!(dates[6], today());
        assert_eq!(AnalyticsPeriod::Quarter.days(), 90);
    }

    #[test]
    fn test_period_wire_names() {
        let p: AnalyticsPeriod = serde_json::from_str("\"90d\"").unwrap();
        assert_eq!(p, AnalyticsPeriod::Quarter);
        assert!(serde_json::from_str::<AnalyticsPeriod>("\"1y\"").is_err());
    }

    #[tokio::test]
    async fn test_sampled_series_are_bounded() {
        let source = SampledAnalytics::new(Some(42));
        let growth = source.growth_samples(AnalyticsPeriod::Month, today()).await.unwrap();
        assert_eq!(growth.len(), 30);
        for (i, s) in growth.iter().enumerate() {
            let base = 10.0 + i as f64 * 0.5;
            assert!(s.height >= base - 1.0 && s.height <= base + 2.0);
            assert!((60.0..=80.0).contains(&s.health));
            assert!((45.0..=75.0).contains(&s.water_level));
        }

        let tasks = source.task_samples(AnalyticsPeriod::Week, today()).await.unwrap();
        assert_eq!(tasks.len(), 7);
        assert!(tasks.iter().all(|t| (3..=7).contains(&t.total) && t.completed <= t.total));
    }

    #[tokio::test]
    async fn test_same_seed_is_reproducible() {
        let a = SampledAnalytics::new(Some(9));
        let b = SampledAnalytics::new(Some(9));
        assert_eq!(
            a.growth_samples(AnalyticsPeriod::Week, today()).await.unwrap(),
            b.growth_samples(AnalyticsPeriod::Week, today()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_report_covers_selected_plants() {
        let source = SampledAnalytics::new(Some(1));
        let plants: Vec<_> = ["Basil", "Mint", "Basil", "Sage", "Dill", "Thyme", "Chive"]
            .iter()
            .map(|n| plant(n))
            .collect();

        let report = build_report(&source, AnalyticsPeriod::Week, None, &plants, today())
            .await
            .unwrap();

        assert_eq!(report.top_plants.len(), TOP_PLANTS_LIMIT);
        assert_eq!(report.name_distribution[0].label, "Basil");
        assert_eq!(report.name_distribution[0].count, 2);
        assert_eq!(report.species_distribution.len(), 1);
        assert_eq!(report.insights.len(), 3);
        assert!(report.recommendations.last().unwrap().contains("weather"));
        assert_eq!(report.source_backend, "sampled");
    }

    #[tokio::test]
    async fn test_report_with_no_plants() {
        let source = SampledAnalytics::new(Some(1));
        let report = build_report(&source, AnalyticsPeriod::Week, Some("b".to_string()), &[], today())
            .await
            .unwrap();
        assert!(report.top_plants.is_empty());
        assert!(report.name_distribution.is_empty());
    }
}
