//! Reference in-memory repository.

use chrono::{Duration, NaiveDate};
use parking_lot::RwLock;

use super::{day_bounds, Repository};
use crate::error::RepositoryError;
use crate::interval::{CategoryFilter, Interval};

/// Keeps records in creation order; ids are 1-based positions.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    intervals: RwLock<Vec<Interval>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intervals.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.read().is_empty()
    }
}

impl Repository for InMemoryRepository {
    fn create(&self, interval: &Interval) -> Result<i64, RepositoryError> {
        let mut intervals = self.intervals.write();
        let id = intervals.len() as i64 + 1;
        intervals.push(Interval::from_parts(
            id,
            interval.category(),
            interval.start_time(),
            interval.planned_duration(),
            interval.actual_duration(),
            interval.state(),
        ));
        Ok(id)
    }

    fn update(&self, interval: &Interval) -> Result<(), RepositoryError> {
        let mut intervals = self.intervals.write();
        let slot = usize::try_from(interval.id() - 1)
            .ok()
            .and_then(|idx| intervals.get_mut(idx))
            .ok_or(RepositoryError::NotFound(interval.id()))?;
        *slot = Interval::from_parts(
            slot.id(),
            slot.category(),
            interval.start_time(),
            slot.planned_duration(),
            interval.actual_duration(),
            interval.state(),
        );
        Ok(())
    }

    fn by_id(&self, id: i64) -> Result<Interval, RepositoryError> {
        let intervals = self.intervals.read();
        usize::try_from(id - 1)
            .ok()
            .and_then(|idx| intervals.get(idx))
            .map(Interval::detached)
            .ok_or(RepositoryError::NotFound(id))
    }

    fn last(&self) -> Result<Interval, RepositoryError> {
        self.intervals
            .read()
            .last()
            .map(Interval::detached)
            .ok_or(RepositoryError::NoIntervals)
    }

    fn breaks(&self, n: usize) -> Result<Vec<Interval>, RepositoryError> {
        Ok(self
            .intervals
            .read()
            .iter()
            .rev()
            .filter(|i| i.category().is_break())
            .take(n)
            .map(Interval::detached)
            .collect())
    }

    fn category_summary(
        &self,
        day: NaiveDate,
        filter: CategoryFilter,
    ) -> Result<Duration, RepositoryError> {
        let (start, end) = day_bounds(day);
        Ok(self
            .intervals
            .read()
            .iter()
            .filter(|i| filter.matches(i.category()))
            .filter(|i| i.start_time() >= start && i.start_time() < end)
            .fold(Duration::zero(), |acc, i| acc + i.actual_duration()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Category, IntervalState};
    use chrono::{Local, Utc};

    fn done(category: Category, secs: i64) -> Interval {
        Interval::from_parts(
            0,
            category,
            Utc::now(),
            Duration::seconds(secs),
            Duration::seconds(secs),
            IntervalState::Done,
        )
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.create(&done(Category::Pomodoro, 1)).unwrap(), 1);
        assert_eq!(repo.create(&done(Category::ShortBreak, 1)).unwrap(), 2);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.last().unwrap().category(), Category::ShortBreak);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.update(&done(Category::Pomodoro, 1)).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(0)));
        assert!(matches!(repo.by_id(3), Err(RepositoryError::NotFound(3))));
        assert!(matches!(repo.last(), Err(RepositoryError::NoIntervals)));
    }

    #[test]
    fn update_writes_mutable_fields() {
        let repo = InMemoryRepository::new();
        let id = repo.create(&done(Category::Pomodoro, 1)).unwrap();
        let changed = Interval::from_parts(
            id,
            Category::Pomodoro,
            Utc::now(),
            Duration::seconds(10),
            Duration::seconds(4),
            IntervalState::Paused,
        );
        repo.update(&changed).unwrap();
        let stored = repo.by_id(id).unwrap();
        assert_eq!(stored.state(), IntervalState::Paused);
        assert_eq!(stored.actual_duration(), Duration::seconds(4));
        assert_eq!(stored.planned_duration(), Duration::seconds(1));
    }

    #[test]
    fn breaks_are_most_recent_first() {
        let repo = InMemoryRepository::new();
        repo.create(&done(Category::ShortBreak, 1)).unwrap();
        repo.create(&done(Category::Pomodoro, 1)).unwrap();
        repo.create(&done(Category::LongBreak, 1)).unwrap();
        repo.create(&done(Category::Pomodoro, 1)).unwrap();

        let breaks = repo.breaks(5).unwrap();
        let ids: Vec<i64> = breaks.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(repo.breaks(1).unwrap().len(), 1);
    }

    #[test]
    fn category_summary_filters_day_and_category() {
        let repo = InMemoryRepository::new();
        repo.create(&done(Category::Pomodoro, 60)).unwrap();
        repo.create(&done(Category::ShortBreak, 30)).unwrap();
        repo.create(&done(Category::LongBreak, 90)).unwrap();
        let old = Interval::from_parts(
            0,
            Category::Pomodoro,
            Utc::now() - Duration::days(3),
            Duration::seconds(600),
            Duration::seconds(600),
            IntervalState::Done,
        );
        repo.create(&old).unwrap();

        let today = Local::now().date_naive();
        assert_eq!(
            repo.category_summary(today, CategoryFilter::Only(Category::Pomodoro)).unwrap(),
            Duration::seconds(60)
        );
        assert_eq!(
            repo.category_summary(today, CategoryFilter::AnyBreak).unwrap(),
            Duration::seconds(120)
        );
        assert_eq!(
            repo.category_summary(today - chrono::Days::new(1), CategoryFilter::Any).unwrap(),
            Duration::zero()
        );
    }
}
