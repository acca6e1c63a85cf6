//! Derived views over store data.
//!
//! Everything here is a pure function of borrowed collections (plus `now`
//! where time matters). Nothing mutates the store.

pub mod analytics;
pub mod budget;
pub mod filters;
pub mod handlers;
pub mod ranking;
pub mod rates;
pub mod sampling;
pub mod tasks;
pub mod weather;

/// Rounds halves towards positive infinity, the way the dashboard rounds
/// percentages (`-2.5 -> -2`, `2.5 -> 3`).
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let rounded = value.round();
    // `f64::round` sends negative halves away from zero.
    if value - rounded == 0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}
