//! Durable parameters shared by every interval of a run.

use chrono::Duration;
use std::fmt;
use std::sync::Arc;

use crate::interval::Category;
use crate::storage::{Repository, Settings};

/// Immutable interval parameters plus the repository handle.
///
/// Created once per process and passed by reference to every interval
/// operation.
#[derive(Clone)]
pub struct IntervalConfig {
    repository: Arc<dyn Repository>,
    pomodoro_duration: Duration,
    short_break_duration: Duration,
    long_break_duration: Duration,
    long_break_every: usize,
}

impl IntervalConfig {
    /// Zero or negative durations are accepted; such intervals complete
    /// immediately.
    pub fn new(
        repository: Arc<dyn Repository>,
        pomodoro_duration: Duration,
        short_break_duration: Duration,
        long_break_duration: Duration,
    ) -> Self {
        Self {
            repository,
            pomodoro_duration,
            short_break_duration,
            long_break_duration,
            long_break_every: 4,
        }
    }

    /// Build from the `[durations]` section of the settings file.
    pub fn from_settings(repository: Arc<dyn Repository>, settings: &Settings) -> Self {
        let d = &settings.durations;
        Self::new(
            repository,
            Duration::minutes(d.pomodoro.into()),
            Duration::minutes(d.short_break.into()),
            Duration::minutes(d.long_break.into()),
        )
        .with_long_break_every(d.pomodoros_before_long_break as usize)
    }

    /// Number of pomodoros per long-break cycle. Values below 1 are treated as 1.
    pub fn with_long_break_every(mut self, pomodoros: usize) -> Self {
        self.long_break_every = pomodoros.max(1);
        self
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }

    pub fn repository_handle(&self) -> Arc<dyn Repository> {
        Arc::clone(&self.repository)
    }

    pub fn pomodoro_duration(&self) -> Duration {
        self.pomodoro_duration
    }

    pub fn short_break_duration(&self) -> Duration {
        self.short_break_duration
    }

    pub fn long_break_duration(&self) -> Duration {
        self.long_break_duration
    }

    pub fn long_break_every(&self) -> usize {
        self.long_break_every
    }

    pub fn planned_duration(&self, category: Category) -> Duration {
        match category {
            Category::Pomodoro => self.pomodoro_duration,
            Category::ShortBreak => self.short_break_duration,
            Category::LongBreak => self.long_break_duration,
        }
    }
}

impl fmt::Debug for IntervalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalConfig")
            .field("pomodoro_duration", &self.pomodoro_duration)
            .field("short_break_duration", &self.short_break_duration)
            .field("long_break_duration", &self.long_break_duration)
            .field("long_break_every", &self.long_break_every)
            .finish_non_exhaustive()
    }
}
