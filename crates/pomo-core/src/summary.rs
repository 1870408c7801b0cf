//! Daily and multi-day duration totals for reporting.

use chrono::{Datelike, Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::IntervalConfig;
use crate::error::{CoreError, RepositoryError};
use crate::interval::{Category, CategoryFilter};

/// Durations for one day, ordered Pomodoro, ShortBreak, LongBreak.
pub type DailySummary = [Duration; 3];

/// One labeled point per day, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub labels: Vec<String>,
    /// Minutes per day.
    pub values: Vec<f64>,
}

impl LineSeries {
    fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            labels: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }
}

/// Per-category totals for `day`; zero where nothing was recorded.
///
/// # Errors
/// Any repository failure.
pub fn daily_summary(day: NaiveDate, config: &IntervalConfig) -> Result<DailySummary, RepositoryError> {
    let repo = config.repository();
    let mut summary = [Duration::zero(); 3];
    for (slot, category) in summary.iter_mut().zip(Category::ALL) {
        *slot = repo.category_summary(day, CategoryFilter::Only(category))?;
    }
    Ok(summary)
}

/// Pomodoro and break minutes for `num_days` days ending at `end_day`.
///
/// Returns the `"Pomodoro"` series followed by the `"Break"` series, each
/// with exactly `num_days` points.
///
/// # Errors
/// `InvalidRange` when the range would start before the earliest
/// representable date, and any repository failure.
pub fn range_summary(
    end_day: NaiveDate,
    num_days: usize,
    config: &IntervalConfig,
) -> crate::Result<[LineSeries; 2]> {
    let first = u64::try_from(num_days.saturating_sub(1))
        .ok()
        .and_then(|back| end_day.checked_sub_days(Days::new(back)))
        .ok_or(CoreError::InvalidRange { end_day, num_days })?;

    let repo = config.repository();
    let mut pomodoro = LineSeries::new("Pomodoro", num_days);
    let mut breaks = LineSeries::new("Break", num_days);

    for day in first.iter_days().take(num_days) {
        let label = day_label(day);
        for (series, filter) in [
            (&mut pomodoro, CategoryFilter::Only(Category::Pomodoro)),
            (&mut breaks, CategoryFilter::AnyBreak),
        ] {
            let total = repo.category_summary(day, filter)?;
            series.labels.push(label.clone());
            series.values.push(minutes(total));
        }
    }
    Ok([pomodoro, breaks])
}

/// `04/Oct` style label.
pub fn day_label(day: NaiveDate) -> String {
    format!("{:02}/{}", day.day(), day.format("%b"))
}

fn minutes(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 60_000.0
}
