//! # pomo core library
//!
//! Business logic for the pomo Pomodoro timer. The CLI binary is a thin
//! layer over this crate.
//!
//! ## Architecture
//!
//! - **Interval engine**: an async state machine that owns a one-second tick
//!   loop, reports progress through callbacks and accepts pause/resume from
//!   other tasks through an [`IntervalHandle`]
//! - **Sequencer**: picks the next category from recorded history
//! - **Storage**: the [`Repository`] trait with in-memory and SQLite
//!   backends, plus the TOML [`Settings`] file
//! - **Summary**: daily and multi-day duration totals
//!
//! ## Key Components
//!
//! - [`Interval`]: one timed session
//! - [`IntervalConfig`]: durations and repository shared by every interval
//! - [`get_interval`]: the next interval to run
//! - [`daily_summary`] / [`range_summary`]: reporting

pub mod config;
pub mod error;
pub mod events;
pub mod interval;
pub mod storage;
pub mod summary;

pub use config::IntervalConfig;
pub use error::{CoreError, IntervalError, RepositoryError, Result, SettingsError};
pub use events::Event;
pub use interval::{
    get_interval, next_category, Category, CategoryFilter, Interval, IntervalHandle, IntervalState,
};
pub use storage::{InMemoryRepository, Repository, Settings, SqliteRepository};
pub use summary::{daily_summary, range_summary, DailySummary, LineSeries};
