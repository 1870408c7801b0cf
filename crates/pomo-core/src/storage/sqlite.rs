//! SQLite-backed interval repository.
//!
//! One connection guarded by a mutex: every statement, read or write, runs
//! to completion before the next one starts.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use super::{day_bounds, migrations, Repository};
use crate::error::RepositoryError;
use crate::interval::{Category, CategoryFilter, Interval, IntervalState};

const SELECT_COLUMNS: &str =
    "SELECT id, start_time, planned_duration, actual_duration, category, state FROM intervals";

pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database file and apply migrations.
    ///
    /// # Errors
    /// Returns a storage error if the file cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path).map_err(|e| RepositoryError::storage("open", e))?;
        debug!(path = %path.display(), "opened interval database");
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| RepositoryError::storage("open", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        migrations::migrate(&conn).map_err(|e| RepositoryError::storage("migrate", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn nanos(d: Duration) -> i64 {
    d.num_nanoseconds()
        .unwrap_or(if d < Duration::zero() { i64::MIN } else { i64::MAX })
}

fn conversion_error(idx: usize, ty: Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, message.into())
}

fn row_to_interval(row: &Row<'_>) -> rusqlite::Result<Interval> {
    let start_time: String = row.get(1)?;
    let start_time = DateTime::parse_from_rfc3339(&start_time)
        .map_err(|e| conversion_error(1, Type::Text, e.to_string()))?
        .with_timezone(&Utc);
    let category: String = row.get(4)?;
    let category = category
        .parse::<Category>()
        .map_err(|e| conversion_error(4, Type::Text, e))?;
    let state: u8 = row.get(5)?;
    let state = IntervalState::from_u8(state)
        .ok_or_else(|| conversion_error(5, Type::Integer, format!("unknown state: {state}")))?;

    Ok(Interval::from_parts(
        row.get(0)?,
        category,
        start_time,
        Duration::nanoseconds(row.get(2)?),
        Duration::nanoseconds(row.get(3)?),
        state,
    ))
}

impl Repository for SqliteRepository {
    fn create(&self, interval: &Interval) -> Result<i64, RepositoryError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO intervals (start_time, planned_duration, actual_duration, category, state)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                timestamp(interval.start_time()),
                nanos(interval.planned_duration()),
                nanos(interval.actual_duration()),
                interval.category().as_str(),
                interval.state().as_u8(),
            ],
        )
        .map_err(|e| RepositoryError::storage("create", e))?;
        let id = conn.last_insert_rowid();
        debug!(id, category = %interval.category(), "interval row inserted");
        Ok(id)
    }

    fn update(&self, interval: &Interval) -> Result<(), RepositoryError> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE intervals SET start_time = ?1, actual_duration = ?2, state = ?3 WHERE id = ?4",
                params![
                    timestamp(interval.start_time()),
                    nanos(interval.actual_duration()),
                    interval.state().as_u8(),
                    interval.id(),
                ],
            )
            .map_err(|e| RepositoryError::storage("update", e))?;
        if changed == 0 {
            return Err(RepositoryError::NotFound(interval.id()));
        }
        Ok(())
    }

    fn by_id(&self, id: i64) -> Result<Interval, RepositoryError> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            row_to_interval,
        )
        .optional()
        .map_err(|e| RepositoryError::storage("by_id", e))?
        .ok_or(RepositoryError::NotFound(id))
    }

    fn last(&self) -> Result<Interval, RepositoryError> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT 1"),
            [],
            row_to_interval,
        )
        .optional()
        .map_err(|e| RepositoryError::storage("last", e))?
        .ok_or(RepositoryError::NoIntervals)
    }

    fn breaks(&self, n: usize) -> Result<Vec<Interval>, RepositoryError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE category LIKE ?1 ORDER BY id DESC LIMIT ?2"
            ))
            .map_err(|e| RepositoryError::storage("breaks", e))?;
        let rows = stmt
            .query_map(
                params![
                    CategoryFilter::AnyBreak.like_pattern(),
                    i64::try_from(n).unwrap_or(i64::MAX)
                ],
                row_to_interval,
            )
            .map_err(|e| RepositoryError::storage("breaks", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| RepositoryError::storage("breaks", e))
    }

    fn category_summary(
        &self,
        day: NaiveDate,
        filter: CategoryFilter,
    ) -> Result<Duration, RepositoryError> {
        let (start, end) = day_bounds(day);
        let conn = self.conn.lock();
        let total: i64 = conn
            .query_row(
                "SELECT COALESCE(SUM(actual_duration), 0) FROM intervals
                 WHERE category LIKE ?1 AND start_time >= ?2 AND start_time < ?3",
                params![filter.like_pattern(), timestamp(start), timestamp(end)],
                |row| row.get(0),
            )
            .map_err(|e| RepositoryError::storage("category_summary", e))?;
        Ok(Duration::nanoseconds(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

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
    fn record_and_query() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let id = repo.create(&done(Category::Pomodoro, 25)).unwrap();
        let stored = repo.by_id(id).unwrap();
        assert_eq!(stored.id(), id);
        assert_eq!(stored.category(), Category::Pomodoro);
        assert_eq!(stored.planned_duration(), Duration::seconds(25));
        assert_eq!(stored.state(), IntervalState::Done);
        assert_eq!(repo.last().unwrap().id(), id);
    }

    #[test]
    fn empty_and_missing() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        assert!(matches!(repo.last(), Err(RepositoryError::NoIntervals)));
        assert!(matches!(repo.by_id(4), Err(RepositoryError::NotFound(4))));
        let err = repo.update(&done(Category::Pomodoro, 1)).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(0)));
    }

    #[test]
    fn breaks_and_summary() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.create(&done(Category::Pomodoro, 120)).unwrap();
        repo.create(&done(Category::ShortBreak, 60)).unwrap();
        repo.create(&done(Category::Pomodoro, 120)).unwrap();
        repo.create(&done(Category::LongBreak, 180)).unwrap();

        let breaks = repo.breaks(3).unwrap();
        assert_eq!(breaks.len(), 2);
        assert_eq!(breaks[0].category(), Category::LongBreak);
        assert_eq!(breaks[1].category(), Category::ShortBreak);

        let today = Local::now().date_naive();
        assert_eq!(
            repo.category_summary(today, Category::Pomodoro.into()).unwrap(),
            Duration::seconds(240)
        );
        assert_eq!(
            repo.category_summary(today, CategoryFilter::AnyBreak).unwrap(),
            Duration::seconds(240)
        );
        assert_eq!(
            repo.category_summary(today.succ_opt().unwrap(), CategoryFilter::Any)
                .unwrap(),
            Duration::zero()
        );
    }
}
