//! Dual-window (per-minute and per-day) rate limiter.

use crate::{QuotaSnapshot, RateLimitConfig};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tollbooth_core::{CallContext, instant_after};
use tollbooth_error::{QuotaError, QuotaScope, TollboothResult};
use tracing::{debug, instrument, warn};

/// One fixed-length window that refills all at once.
#[derive(Debug, Clone)]
struct QuotaWindow {
    scope: QuotaScope,
    capacity: u32,
    tokens: u32,
    length: Duration,
    started: Instant,
}

impl QuotaWindow {
    fn new(scope: QuotaScope, capacity: u32, length: Duration, now: Instant) -> Self {
        Self {
            scope,
            capacity,
            tokens: capacity,
            length,
            started: now,
        }
    }

    fn elapsed_window(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.length
    }

    fn refresh(&mut self, now: Instant) {
        if self.elapsed_window(now) {
            self.tokens = self.capacity;
            self.started = now;
        }
    }

    fn resets_in(&self, now: Instant) -> Duration {
        instant_after(self.started, self.length).saturating_duration_since(now)
    }

    /// Tokens as they would be after a refresh, without mutating.
    fn available(&self, now: Instant) -> u32 {
        if self.elapsed_window(now) {
            self.capacity
        } else {
            self.tokens
        }
    }

    #[track_caller]
    fn exhausted(&self, now: Instant) -> QuotaError {
        QuotaError::new(self.scope, self.capacity, self.resets_in(now))
    }

    fn sync(&mut self, limit: Option<u32>, remaining: Option<u32>) {
        if let Some(limit) = limit {
            self.capacity = limit;
        }
        if let Some(remaining) = remaining {
            self.tokens = remaining;
        }
        self.tokens = self.tokens.min(self.capacity);
    }
}

#[derive(Debug)]
struct LimiterState {
    minute: QuotaWindow,
    day: QuotaWindow,
    blocked_until: Option<Instant>,
}

enum Acquire {
    Granted,
    Sleep(Duration),
    Refused(QuotaError),
}

impl LimiterState {
    fn blackout_remaining(&self, now: Instant) -> Option<Duration> {
        self.blocked_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }

    fn acquire(&mut self, now: Instant) -> Acquire {
        if let Some(remaining) = self.blackout_remaining(now) {
            return Acquire::Sleep(remaining);
        }

        self.minute.refresh(now);
        self.day.refresh(now);

        if self.day.tokens == 0 {
            return Acquire::Refused(self.day.exhausted(now));
        }
        if self.minute.capacity == 0 {
            return Acquire::Refused(self.minute.exhausted(now));
        }
        if self.minute.tokens > 0 {
            self.minute.tokens -= 1;
            self.day.tokens -= 1;
            return Acquire::Granted;
        }
        Acquire::Sleep(self.minute.resets_in(now))
    }

    fn try_acquire(&mut self, now: Instant) -> Result<(), QuotaError> {
        if let Some(remaining) = self.blackout_remaining(now) {
            return Err(QuotaError::new(QuotaScope::Blackout, 0, remaining));
        }

        self.minute.refresh(now);
        self.day.refresh(now);

        if self.day.tokens == 0 {
            return Err(self.day.exhausted(now));
        }
        if self.minute.tokens == 0 {
            return Err(self.minute.exhausted(now));
        }
        self.minute.tokens -= 1;
        self.day.tokens -= 1;
        Ok(())
    }
}

/// Point-in-time view of the limiter's windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStats {
    /// Minute-window capacity
    pub minute_limit: u32,
    /// Requests consumed in the current minute window
    pub minute_used: u32,
    /// Requests left in the current minute window
    pub minute_remaining: u32,
    /// Time until the minute window refills
    pub minute_resets_in: Duration,
    /// Day-window capacity
    pub day_limit: u32,
    /// Requests consumed in the current day window
    pub day_used: u32,
    /// Requests left in the current day window
    pub day_remaining: u32,
    /// Time until the day window refills
    pub day_resets_in: Duration,
    /// Remaining server-imposed blackout
    pub blocked_for: Option<Duration>,
}

/// Enforces a per-minute and a per-day request quota for one credential.
///
/// All accounting happens under a single mutex that is never held across an
/// `.await`; waiting callers sleep outside the lock and re-check afterwards.
/// Counts are advisory: [`RateLimiter::sync_from_authoritative`] overwrites
/// them with whatever the server last reported.
///
/// # Example
///
/// ```
/// use tollbooth_rate_limit::RateLimiter;
///
/// let limiter = RateLimiter::new(2, 100);
/// assert!(limiter.try_acquire().is_ok());
/// assert!(limiter.try_acquire().is_ok());
/// assert!(limiter.try_acquire().is_err());
/// assert_eq!(limiter.remaining_day(), 98);
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
    max_server_backoff: Duration,
}

impl RateLimiter {
    /// Limiter with default window lengths and the given capacities.
    pub fn new(requests_per_minute: u32, requests_per_day: u32) -> Self {
        Self::from_config(&RateLimitConfig::with_limits(
            requests_per_minute,
            requests_per_day,
        ))
    }

    /// Limiter built from configuration.
    #[instrument(skip_all, fields(rpm = config.requests_per_minute(), rpd = config.requests_per_day()))]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let now = Instant::now();
        debug!("Creating rate limiter");
        Self {
            state: Mutex::new(LimiterState {
                minute: QuotaWindow::new(
                    QuotaScope::Minute,
                    *config.requests_per_minute(),
                    config.minute_window(),
                    now,
                ),
                day: QuotaWindow::new(
                    QuotaScope::Day,
                    *config.requests_per_day(),
                    config.day_window(),
                    now,
                ),
                blocked_until: None,
            }),
            max_server_backoff: config.max_server_backoff(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a permit is available, consuming one from both windows.
    ///
    /// Sleeps through server blackouts and minute-window exhaustion. Fails
    /// immediately when the day window is exhausted or the minute window has
    /// zero capacity.
    ///
    /// # Errors
    ///
    /// Returns a quota error for day exhaustion or zero minute capacity, and a
    /// cancellation error when `ctx` ends while waiting.
    #[instrument(skip_all)]
    pub async fn wait(&self, ctx: &CallContext) -> TollboothResult<()> {
        ctx.check()?;
        loop {
            let step = self.lock().acquire(Instant::now());
            match step {
                Acquire::Granted => return Ok(()),
                Acquire::Refused(err) => {
                    warn!(scope = %err.scope, reset_in = ?err.reset_in, "Rate limit refused request");
                    return Err(err.into());
                }
                Acquire::Sleep(delay) => {
                    debug!(?delay, "Waiting for rate limit permit");
                    ctx.sleep(delay).await?;
                }
            }
        }
    }

    /// Take a permit if one is available right now.
    ///
    /// The error names the scope that refused.
    pub fn try_acquire(&self) -> Result<(), QuotaScope> {
        self.allow().map_err(|e| e.scope)
    }

    /// Take a permit if one is available right now.
    ///
    /// # Errors
    ///
    /// Returns a quota error carrying the refusing scope, its capacity and the
    /// time until it admits requests again.
    pub fn allow(&self) -> Result<(), QuotaError> {
        self.lock().try_acquire(Instant::now())
    }

    /// Apply a server-advised blackout, capped at the configured maximum.
    ///
    /// A zero delay is ignored. The blackout only ever moves later.
    #[instrument(skip(self))]
    pub fn update_from_server_signal(&self, retry_after: Duration) {
        if retry_after.is_zero() {
            return;
        }
        let capped = retry_after.min(self.max_server_backoff);
        let until = instant_after(Instant::now(), capped);

        let mut state = self.lock();
        if state.blocked_until.is_none_or(|current| until > current) {
            state.blocked_until = Some(until);
            warn!(blackout = ?capped, "Server requested backoff");
        }
    }

    /// Overwrite local counts with server-reported counters.
    ///
    /// Present limits replace capacities, present remaining counts replace
    /// token counts (clamped to capacity). Absent values leave state untouched.
    #[instrument(skip(self))]
    pub fn sync_from_authoritative(&self, snapshot: QuotaSnapshot) {
        if snapshot.is_empty() {
            return;
        }
        let mut state = self.lock();
        state
            .minute
            .sync(snapshot.minute_limit, snapshot.minute_remaining);
        state.day.sync(snapshot.day_limit, snapshot.day_remaining);
        debug!(
            minute_remaining = state.minute.tokens,
            day_remaining = state.day.tokens,
            "Synced quota from server"
        );
    }

    /// Snapshot of both windows and any blackout.
    pub fn stats(&self) -> RateLimitStats {
        let now = Instant::now();
        let state = self.lock();
        let minute_remaining = state.minute.available(now);
        let day_remaining = state.day.available(now);
        RateLimitStats {
            minute_limit: state.minute.capacity,
            minute_used: state.minute.capacity.saturating_sub(minute_remaining),
            minute_remaining,
            minute_resets_in: window_resets_in(&state.minute, now),
            day_limit: state.day.capacity,
            day_used: state.day.capacity.saturating_sub(day_remaining),
            day_remaining,
            day_resets_in: window_resets_in(&state.day, now),
            blocked_for: state.blackout_remaining(now),
        }
    }

    /// Requests left in the current minute window.
    pub fn remaining_minute(&self) -> u32 {
        self.lock().minute.available(Instant::now())
    }

    /// Requests left in the current day window.
    pub fn remaining_day(&self) -> u32 {
        self.lock().day.available(Instant::now())
    }

    /// Remaining server-imposed blackout, if any.
    pub fn blocked_for(&self) -> Option<Duration> {
        self.lock().blackout_remaining(Instant::now())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

fn window_resets_in(window: &QuotaWindow, now: Instant) -> Duration {
    if window.elapsed_window(now) {
        window.length
    } else {
        window.resets_in(now)
    }
}
