//! Overflow-free instant arithmetic.

use std::time::Duration;
use tokio::time::Instant;

/// Stand-in for "never": roughly 30 years.
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + delay`, clamped to [`FAR_FUTURE`] past `now`.
///
/// Durations from configuration or servers may be arbitrarily large;
/// plain `Instant + Duration` panics on overflow.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tokio::time::Instant;
/// use tollbooth_core::{FAR_FUTURE, instant_after};
///
/// let now = Instant::now();
/// assert_eq!(instant_after(now, Duration::from_secs(5)), now + Duration::from_secs(5));
/// assert_eq!(instant_after(now, Duration::MAX), now + FAR_FUTURE);
/// ```
pub fn instant_after(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay.min(FAR_FUTURE)).unwrap_or(now)
}
