//! Interval engine.
//!
//! An [`Interval`] owns its tick loop: [`Interval::start`] persists the
//! record, then credits one second per tick until the planned duration is
//! reached. Other tasks steer a live run through an [`IntervalHandle`], which
//! only flips a shared state flag and wakes the loop. The loop task is the
//! single writer of the record while the run is live.
//!
//! ## State Transitions
//!
//! ```text
//! NotStarted -> Running <-> Paused
//! Running -> Done
//! NotStarted | Running | Paused -> Cancelled   (Interval::cancel)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut interval = get_interval(&config)?;
//! let handle = interval.handle();
//! interval.start(&token, &config, on_start, on_tick, on_end).await?;
//! // from another task:
//! handle.pause().await?;
//! ```

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::category::{Category, IntervalState};
use crate::config::IntervalConfig;
use crate::error::IntervalError;
use crate::storage::Repository;

fn tick() -> Duration {
    Duration::seconds(1)
}

/// Shared between an interval and its handles.
#[derive(Debug)]
struct Control {
    /// Requested state; the loop applies it on wake.
    state: AtomicU8,
    live: AtomicBool,
    wake: Notify,
    /// Last state the loop wrote to the repository.
    persisted: watch::Sender<IntervalState>,
}

impl Control {
    fn new(state: IntervalState) -> Arc<Self> {
        let (persisted, _) = watch::channel(state);
        Arc::new(Self {
            state: AtomicU8::new(state.as_u8()),
            live: AtomicBool::new(false),
            wake: Notify::new(),
            persisted,
        })
    }

    fn state(&self) -> IntervalState {
        IntervalState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(IntervalState::NotStarted)
    }

    fn set_state(&self, state: IntervalState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn publish(&self, state: IntervalState) {
        self.persisted.send_replace(state);
    }

    /// End the live run. A request the loop never applied is rolled back
    /// to the last persisted state, and waiters are released.
    fn detach(&self) {
        self.live.store(false, Ordering::Release);
        self.set_state(*self.persisted.borrow());
        self.persisted.send_modify(|_| {});
    }

    /// Atomically move `from -> to`, wake the loop and wait until it has
    /// persisted the change (or the run ended).
    async fn request(&self, from: IntervalState, to: IntervalState) -> bool {
        let mut persisted = self.persisted.subscribe();
        if !self.is_live() {
            return false;
        }
        if self
            .state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.wake.notify_one();
        let applied = persisted
            .wait_for(|s| *s == to || self.state() != to || !self.is_live())
            .await
            .map(|s| *s == to)
            .unwrap_or(false);
        if !applied {
            // The run ended before the loop picked the request up.
            let _ = self.state.compare_exchange(
                to.as_u8(),
                from.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        applied
    }
}

/// Clears the live flag when a run ends, including when the `start`
/// future is dropped mid-flight.
struct LiveGuard(Arc<Control>);

impl LiveGuard {
    fn enter(control: &Arc<Control>) -> Self {
        control.live.store(true, Ordering::Release);
        Self(Arc::clone(control))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.detach();
    }
}

/// One timed Pomodoro or break session.
///
/// Clones share the live control block, so a handle taken from any clone
/// steers the same run.
#[derive(Debug, Clone)]
pub struct Interval {
    id: i64,
    category: Category,
    start_time: DateTime<Utc>,
    planned_duration: Duration,
    actual_duration: Duration,
    state: IntervalState,
    control: Arc<Control>,
}

impl Interval {
    /// A fresh, not yet persisted interval.
    pub fn new(category: Category, planned_duration: Duration) -> Self {
        Self::from_parts(
            0,
            category,
            Utc::now(),
            planned_duration,
            Duration::zero(),
            IntervalState::NotStarted,
        )
    }

    /// Rebuild an interval from a persisted record.
    pub fn from_parts(
        id: i64,
        category: Category,
        start_time: DateTime<Utc>,
        planned_duration: Duration,
        actual_duration: Duration,
        state: IntervalState,
    ) -> Self {
        Self {
            id,
            category,
            start_time,
            planned_duration,
            actual_duration,
            state,
            control: Control::new(state),
        }
    }

    /// Copy of the record fields with its own, detached control block.
    pub fn detached(&self) -> Self {
        Self::from_parts(
            self.id,
            self.category,
            self.start_time,
            self.planned_duration,
            self.actual_duration,
            self.state,
        )
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn planned_duration(&self) -> Duration {
        self.planned_duration
    }

    pub fn actual_duration(&self) -> Duration {
        self.actual_duration
    }

    pub fn state(&self) -> IntervalState {
        self.state
    }

    pub fn remaining(&self) -> Duration {
        (self.planned_duration - self.actual_duration).max(Duration::zero())
    }

    /// 0.0 .. 1.0 progress.
    pub fn progress(&self) -> f64 {
        let planned = self.planned_duration.num_milliseconds();
        if planned <= 0 {
            return 1.0;
        }
        (self.actual_duration.num_milliseconds() as f64 / planned as f64).min(1.0)
    }

    pub fn handle(&self) -> IntervalHandle {
        IntervalHandle {
            control: Arc::clone(&self.control),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run the interval to completion.
    ///
    /// Persists the initial record, calls `on_start`, then ticks once per
    /// second calling `on_tick` after every credited second and `on_end`
    /// once the planned duration is reached. Cancelling `cancel` stops the
    /// loop and leaves the persisted state as it was (Running or Paused).
    ///
    /// # Errors
    /// `AlreadyStarted` unless the interval is NotStarted, `Cancelled` when
    /// the token fires, and any repository failure wrapped with the
    /// operation that failed.
    pub async fn start<S, T, E>(
        &mut self,
        cancel: &CancellationToken,
        config: &IntervalConfig,
        mut on_start: S,
        mut on_tick: T,
        mut on_end: E,
    ) -> Result<(), IntervalError>
    where
        S: FnMut(&Interval),
        T: FnMut(&Interval),
        E: FnMut(&Interval),
    {
        if self.state != IntervalState::NotStarted {
            return Err(IntervalError::AlreadyStarted);
        }
        let repo = config.repository();

        self.state = IntervalState::Running;
        self.start_time = Utc::now();
        self.actual_duration = Duration::zero();
        self.id = match repo.create(self) {
            Ok(id) => id,
            Err(e) => {
                self.state = IntervalState::NotStarted;
                return Err(IntervalError::repository("create")(e));
            }
        };

        self.control.set_state(IntervalState::Running);
        self.control.publish(IntervalState::Running);
        let _live = LiveGuard::enter(&self.control);
        info!(
            id = self.id,
            category = %self.category,
            planned_secs = self.planned_duration.num_seconds(),
            "interval started"
        );

        on_start(self);
        self.run(cancel, repo, &mut on_tick, &mut on_end).await
    }

    /// Mark an interval that is not running in this process as Cancelled.
    ///
    /// Persists the change when the interval already has a record.
    ///
    /// # Errors
    /// `AlreadyStarted` while a run is live, `Repository` if the write fails.
    pub fn cancel(&mut self, config: &IntervalConfig) -> Result<(), IntervalError> {
        if self.control.is_live() {
            return Err(IntervalError::AlreadyStarted);
        }
        if self.state.is_terminal() {
            return Ok(());
        }
        self.state = IntervalState::Cancelled;
        self.control.set_state(IntervalState::Cancelled);
        if self.id != 0 {
            config
                .repository()
                .update(self)
                .map_err(IntervalError::repository("update"))?;
        }
        info!(id = self.id, "interval cancelled");
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn run<T, E>(
        &mut self,
        cancel: &CancellationToken,
        repo: &dyn Repository,
        on_tick: &mut T,
        on_end: &mut E,
    ) -> Result<(), IntervalError>
    where
        T: FnMut(&Interval),
        E: FnMut(&Interval),
    {
        if self.remaining() <= Duration::zero() {
            return self.finish(repo, on_end);
        }

        let control = Arc::clone(&self.control);
        let mut deadline = Instant::now() + to_std(self.remaining().min(tick()));
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(
                        id = self.id,
                        state = ?self.state,
                        actual_secs = self.actual_duration.num_seconds(),
                        "interval run cancelled"
                    );
                    return Err(IntervalError::Cancelled);
                }
                _ = control.wake.notified() => {
                    self.apply_requested(repo)?;
                }
                _ = sleep_until(deadline) => {
                    if self.state != IntervalState::Running {
                        deadline += to_std(tick());
                        continue;
                    }
                    let step = self.remaining().min(tick());
                    self.actual_duration = self.actual_duration + step;
                    repo.update(self).map_err(IntervalError::repository("update"))?;
                    debug!(
                        id = self.id,
                        actual_secs = self.actual_duration.num_seconds(),
                        "tick"
                    );
                    on_tick(self);

                    if self.remaining() <= Duration::zero() {
                        return self.finish(repo, on_end);
                    }
                    deadline += to_std(self.remaining().min(tick()));
                }
            }
        }
    }

    fn apply_requested(&mut self, repo: &dyn Repository) -> Result<(), IntervalError> {
        let requested = self.control.state();
        if requested != self.state
            && matches!(requested, IntervalState::Running | IntervalState::Paused)
        {
            self.state = requested;
            repo.update(self).map_err(IntervalError::repository("update"))?;
            info!(
                id = self.id,
                state = ?self.state,
                actual_secs = self.actual_duration.num_seconds(),
                "interval state changed"
            );
        }
        self.control.publish(self.state);
        Ok(())
    }

    fn finish<E>(&mut self, repo: &dyn Repository, on_end: &mut E) -> Result<(), IntervalError>
    where
        E: FnMut(&Interval),
    {
        self.state = IntervalState::Done;
        self.control.set_state(IntervalState::Done);
        repo.update(self).map_err(IntervalError::repository("update"))?;
        self.control.publish(IntervalState::Done);
        info!(
            id = self.id,
            category = %self.category,
            actual_secs = self.actual_duration.num_seconds(),
            "interval done"
        );
        on_end(self);
        Ok(())
    }
}

fn to_std(d: Duration) -> std::time::Duration {
    d.to_std().unwrap_or_default()
}

/// Steers a live run from another task.
#[derive(Debug, Clone)]
pub struct IntervalHandle {
    control: Arc<Control>,
}

impl IntervalHandle {
    /// Pause the live run. Crediting stops until [`resume`](Self::resume).
    ///
    /// Returns once the loop has persisted the Paused state.
    ///
    /// # Errors
    /// `NotRunning` if the interval is not currently running; nothing is
    /// persisted in that case.
    pub async fn pause(&self) -> Result<(), IntervalError> {
        if self
            .control
            .request(IntervalState::Running, IntervalState::Paused)
            .await
        {
            Ok(())
        } else {
            warn!(state = ?self.control.state(), "pause ignored: interval not running");
            Err(IntervalError::NotRunning)
        }
    }

    /// Resume a paused run, crediting from the frozen actual duration.
    ///
    /// # Errors
    /// `NotPaused` if the interval is not currently paused.
    pub async fn resume(&self) -> Result<(), IntervalError> {
        if self
            .control
            .request(IntervalState::Paused, IntervalState::Running)
            .await
        {
            Ok(())
        } else {
            Err(IntervalError::NotPaused)
        }
    }

    /// Pause when running, resume when paused.
    pub async fn toggle(&self) -> Result<IntervalState, IntervalError> {
        match self.control.state() {
            IntervalState::Paused => self.resume().await.map(|_| IntervalState::Running),
            _ => self.pause().await.map(|_| IntervalState::Paused),
        }
    }

    pub fn state(&self) -> IntervalState {
        self.control.state()
    }

    /// Whether a tick loop is currently driving the interval.
    pub fn is_live(&self) -> bool {
        self.control.is_live()
    }
}
