//! Every backend must honour the same repository contract.

mod common;

use chrono::{Local, Utc};
use common::{completed, secs};
use pomo_core::{
    Category, CategoryFilter, InMemoryRepository, Interval, IntervalState, Repository,
    RepositoryError, SqliteRepository,
};
use std::sync::Arc;
use std::thread;

fn backends() -> Vec<(&'static str, Arc<dyn Repository>)> {
    vec![
        ("memory", Arc::new(InMemoryRepository::new())),
        ("sqlite", Arc::new(SqliteRepository::open_in_memory().unwrap())),
    ]
}

#[test]
fn empty_store_conditions() {
    for (name, repo) in backends() {
        assert!(matches!(repo.last(), Err(RepositoryError::NoIntervals)), "{name}");
        assert!(matches!(repo.by_id(1), Err(RepositoryError::NotFound(1))), "{name}");
        assert!(repo.breaks(3).unwrap().is_empty(), "{name}");
        let today = Local::now().date_naive();
        assert_eq!(
            repo.category_summary(today, CategoryFilter::Any).unwrap(),
            secs(0),
            "{name}"
        );
    }
}

#[test]
fn create_then_update_round_trips_fields() {
    for (name, repo) in backends() {
        let start = Utc::now();
        let fresh = Interval::from_parts(
            0,
            Category::LongBreak,
            start,
            secs(900),
            secs(0),
            IntervalState::Running,
        );
        let id = repo.create(&fresh).unwrap();
        assert!(id > 0, "{name}");

        let progressed = Interval::from_parts(
            id,
            Category::LongBreak,
            start,
            secs(900),
            secs(42),
            IntervalState::Paused,
        );
        repo.update(&progressed).unwrap();

        let stored = repo.by_id(id).unwrap();
        assert_eq!(stored.category(), Category::LongBreak, "{name}");
        assert_eq!(stored.planned_duration(), secs(900), "{name}");
        assert_eq!(stored.actual_duration(), secs(42), "{name}");
        assert_eq!(stored.state(), IntervalState::Paused, "{name}");
        assert_eq!(stored.start_time(), start, "{name}");

        let missing = Interval::from_parts(
            id + 100,
            Category::Pomodoro,
            start,
            secs(1),
            secs(1),
            IntervalState::Done,
        );
        assert!(
            matches!(repo.update(&missing), Err(RepositoryError::NotFound(n)) if n == id + 100),
            "{name}"
        );
    }
}

#[test]
fn update_keeps_category_and_planned_duration() {
    for (name, repo) in backends() {
        let start = Utc::now();
        let id = repo
            .create(&Interval::from_parts(
                0,
                Category::Pomodoro,
                start,
                secs(1500),
                secs(0),
                IntervalState::Running,
            ))
            .unwrap();

        let rewritten = Interval::from_parts(
            id,
            Category::LongBreak,
            start,
            secs(60),
            secs(30),
            IntervalState::Paused,
        );
        repo.update(&rewritten).unwrap();

        let stored = repo.by_id(id).unwrap();
        assert_eq!(stored.category(), Category::Pomodoro, "{name}");
        assert_eq!(stored.planned_duration(), secs(1500), "{name}");
        assert_eq!(stored.actual_duration(), secs(30), "{name}");
        assert_eq!(stored.state(), IntervalState::Paused, "{name}");
    }
}

#[test]
fn last_and_breaks_follow_creation_order() {
    for (name, repo) in backends() {
        for c in [
            Category::Pomodoro,
            Category::ShortBreak,
            Category::Pomodoro,
            Category::LongBreak,
            Category::Pomodoro,
        ] {
            repo.create(&completed(c, 0, 60)).unwrap();
        }
        assert_eq!(repo.last().unwrap().id(), 5, "{name}");
        let breaks: Vec<Category> = repo.breaks(3).unwrap().iter().map(|i| i.category()).collect();
        assert_eq!(breaks, vec![Category::LongBreak, Category::ShortBreak], "{name}");
    }
}

#[test]
fn concurrent_writers_are_serialized() {
    for (name, repo) in backends() {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for _ in 0..25 {
                        repo.create(&completed(Category::Pomodoro, 0, 60)).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(repo.last().unwrap().id(), 100, "{name}");
        let today = Local::now().date_naive();
        assert_eq!(
            repo.category_summary(today, Category::Pomodoro.into()).unwrap(),
            secs(6000),
            "{name}"
        );
    }
}
