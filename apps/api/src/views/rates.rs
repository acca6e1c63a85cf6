use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::round_half_up;

/// One day of plant growth measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSample {
    pub date: NaiveDate,
    pub height: f64,
    pub health: f64,
    pub water_level: f64,
}

/// One day of task throughput.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletionSample {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
}

/// Percentage height change from the first to the last sample.
pub fn growth_rate(samples: &[GrowthSample]) -> i64 {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return 0;
    };
    if samples.len() < 2 || first.height == 0.0 {
        return 0;
    }
    round_half_up((last.height - first.height) / first.height * 100.0)
}

pub fn average_health(samples: &[GrowthSample]) -> i64 {
    if samples.is_empty() {
        return 0;
    }
    let sum: f64 = samples.iter().map(|s| s.health).sum();
    round_half_up(sum / samples.len() as f64)
}

pub fn task_completion_rate(samples: &[TaskCompletionSample]) -> i64 {
    let completed: u64 = samples.iter().map(|s| u64::from(s.completed)).sum();
    let total: u64 = samples.iter().map(|s| u64::from(s.total)).sum();
    ratio_percent(completed, total)
}

/// Completed over total as a rounded percentage; 0 when there is nothing to count.
pub fn completion_percentage(completed: usize, total: usize) -> i64 {
    ratio_percent(completed as u64, total as u64)
}

fn ratio_percent(part: u64, whole: u64) -> i64 {
    if whole == 0 {
        return 0;
    }
    round_half_up(part as f64 / whole as f64 * 100.0)
}
