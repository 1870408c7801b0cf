use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{Category, Interval, IntervalState};

/// Every visible change to an interval produces an Event.
/// Front ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    IntervalStarted {
        id: i64,
        category: Category,
        planned_secs: i64,
        at: DateTime<Utc>,
    },
    IntervalTick {
        id: i64,
        category: Category,
        actual_secs: i64,
        remaining_secs: i64,
        /// Fraction of the planned duration credited so far.
        progress: f64,
        at: DateTime<Utc>,
    },
    IntervalPaused {
        id: i64,
        actual_secs: i64,
        at: DateTime<Utc>,
    },
    IntervalResumed {
        id: i64,
        actual_secs: i64,
        at: DateTime<Utc>,
    },
    IntervalCompleted {
        id: i64,
        category: Category,
        actual_secs: i64,
        at: DateTime<Utc>,
    },
    /// The run stopped early; `state` is what stays persisted.
    IntervalCancelled {
        id: i64,
        state: IntervalState,
        actual_secs: i64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn started(interval: &Interval) -> Self {
        Event::IntervalStarted {
            id: interval.id(),
            category: interval.category(),
            planned_secs: interval.planned_duration().num_seconds(),
            at: Utc::now(),
        }
    }

    pub fn tick(interval: &Interval) -> Self {
        Event::IntervalTick {
            id: interval.id(),
            category: interval.category(),
            actual_secs: interval.actual_duration().num_seconds(),
            remaining_secs: interval.remaining().num_seconds(),
            progress: interval.progress(),
            at: Utc::now(),
        }
    }

    pub fn paused(interval: &Interval) -> Self {
        Event::IntervalPaused {
            id: interval.id(),
            actual_secs: interval.actual_duration().num_seconds(),
            at: Utc::now(),
        }
    }

    pub fn resumed(interval: &Interval) -> Self {
        Event::IntervalResumed {
            id: interval.id(),
            actual_secs: interval.actual_duration().num_seconds(),
            at: Utc::now(),
        }
    }

    pub fn completed(interval: &Interval) -> Self {
        Event::IntervalCompleted {
            id: interval.id(),
            category: interval.category(),
            actual_secs: interval.actual_duration().num_seconds(),
            at: Utc::now(),
        }
    }

    pub fn cancelled(interval: &Interval) -> Self {
        Event::IntervalCancelled {
            id: interval.id(),
            state: interval.state(),
            actual_secs: interval.actual_duration().num_seconds(),
            at: Utc::now(),
        }
    }
}
