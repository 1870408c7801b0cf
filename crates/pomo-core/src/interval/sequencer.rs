//! Choice of the next interval category from recorded history.

use tracing::debug;

use super::category::Category;
use super::engine::Interval;
use crate::config::IntervalConfig;
use crate::error::{IntervalError, RepositoryError};
use crate::storage::Repository;

/// Category that should follow the most recent record.
///
/// Pomodoros alternate with breaks; every `long_break_every`-th break is a
/// long one. An empty repository starts with a Pomodoro.
///
/// # Errors
/// Any repository failure other than [`RepositoryError::NoIntervals`].
pub fn next_category(
    repo: &dyn Repository,
    long_break_every: usize,
) -> Result<Category, RepositoryError> {
    let last = match repo.last() {
        Ok(last) => last,
        Err(RepositoryError::NoIntervals) => return Ok(Category::Pomodoro),
        Err(e) => return Err(e),
    };
    if last.category().is_break() {
        return Ok(Category::Pomodoro);
    }

    let needed = long_break_every.saturating_sub(1);
    let recent = repo.breaks(needed)?;
    if recent.len() < needed || recent.iter().any(|i| i.category() == Category::LongBreak) {
        return Ok(Category::ShortBreak);
    }
    Ok(Category::LongBreak)
}

/// Fresh NotStarted interval for the next category, planned from `config`.
///
/// # Errors
/// Fails when the history lookup fails.
pub fn get_interval(config: &IntervalConfig) -> Result<Interval, IntervalError> {
    let category = next_category(config.repository(), config.long_break_every())
        .map_err(IntervalError::repository("history lookup"))?;
    debug!(%category, "next interval");
    Ok(Interval::new(category, config.planned_duration(category)))
}
