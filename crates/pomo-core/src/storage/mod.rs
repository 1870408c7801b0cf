mod memory;
pub mod migrations;
mod settings;
mod sqlite;

pub use memory::InMemoryRepository;
pub use settings::{Backend, DurationSettings, Settings, StorageSettings};
pub use sqlite::SqliteRepository;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::RepositoryError;
use crate::interval::{CategoryFilter, Interval};

/// Durable store for interval records.
///
/// Backends serialize their own writes; an `update` is never observed
/// half-applied by a concurrent reader.
pub trait Repository: Send + Sync {
    /// Persist a new interval and return its assigned id.
    fn create(&self, interval: &Interval) -> Result<i64, RepositoryError>;

    /// Write the mutable fields (`start_time`, `actual_duration`, `state`)
    /// of the record carrying `interval.id()`. Category and planned duration
    /// are fixed at creation.
    fn update(&self, interval: &Interval) -> Result<(), RepositoryError>;

    fn by_id(&self, id: i64) -> Result<Interval, RepositoryError>;

    /// Most recently created record.
    fn last(&self) -> Result<Interval, RepositoryError>;

    /// The `n` most recent break records, most recent first.
    fn breaks(&self, n: usize) -> Result<Vec<Interval>, RepositoryError>;

    /// Total actual duration of matching records started on the local `day`.
    fn category_summary(
        &self,
        day: NaiveDate,
        filter: CategoryFilter,
    ) -> Result<Duration, RepositoryError>;
}

/// Returns `~/.config/pomo[-dev]/` based on POMO_ENV.
///
/// Set POMO_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomo-dev")
    } else {
        base_dir.join("pomo")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// UTC half-open range `[start, end)` covering the local calendar `day`.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(day);
    let end = day
        .succ_opt()
        .map(local_midnight)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Open the backend selected in `settings`.
pub fn open_repository(settings: &Settings) -> crate::Result<Arc<dyn Repository>> {
    let repo: Arc<dyn Repository> = match settings.storage.backend {
        Backend::Memory => Arc::new(InMemoryRepository::new()),
        Backend::Sqlite => {
            let path = match &settings.storage.path {
                Some(path) => path.clone(),
                None => data_dir()?.join("pomo.db"),
            };
            Arc::new(SqliteRepository::open(&path)?)
        }
    };
    Ok(repo)
}
