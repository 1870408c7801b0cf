//! Shared fixtures for pomo-core integration tests.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use pomo_core::{Category, Interval, IntervalConfig, IntervalState, Repository};
use std::sync::Arc;

pub fn secs(n: i64) -> Duration {
    Duration::seconds(n)
}

pub fn config_with(repo: Arc<dyn Repository>, pomodoro: i64, short: i64, long: i64) -> IntervalConfig {
    IntervalConfig::new(repo, secs(pomodoro), secs(short), secs(long))
}

/// A completed record started `days_ago` days before now.
pub fn completed(category: Category, days_ago: i64, actual_secs: i64) -> Interval {
    Interval::from_parts(
        0,
        category,
        Utc::now() - Duration::days(days_ago),
        secs(actual_secs),
        secs(actual_secs),
        IntervalState::Done,
    )
}
