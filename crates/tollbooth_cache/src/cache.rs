//! In-memory TTL cache with background eviction.

use crate::CacheConfig;
use derive_getters::Getters;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tollbooth_core::{FAR_FUTURE, instant_after};
use tracing::{debug, info, warn};

/// Storage for raw response payloads keyed by cache key.
///
/// Implementations must be safe to share across concurrent callers and must
/// never return an entry whose TTL has elapsed.
pub trait ResponseCache: Send + Sync + Debug {
    /// Fetch a live entry.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// A zero `ttl` means the cache's default TTL.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);

    /// Remove one entry. Missing keys are ignored.
    fn delete(&self, key: &str);

    /// Remove every entry.
    fn clear(&self);

    /// Number of stored entries, possibly including expired ones not yet swept.
    fn len(&self) -> usize;

    /// Whether the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop any background work. Must be safe to call more than once.
    fn close(&self) {}
}

/// Cache entry with payload and absolute expiry.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    /// Check if this entry is expired at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

#[derive(Debug)]
struct Store {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Store {
    fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, remaining = entries.len(), "Cleaned up expired cache entries");
        }
        removed
    }
}

#[derive(Debug)]
struct Sweeper {
    token: CancellationToken,
    _handle: JoinHandle<()>,
}

/// Thread-safe in-memory cache with TTL expiry and a periodic sweep task.
///
/// Expired entries are hidden from [`ResponseCache::get`] immediately and
/// physically removed by a tokio task that runs every sweep interval. The task
/// stops on [`ResponseCache::close`] or when the cache is dropped.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tollbooth_cache::{MemoryCache, ResponseCache};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = MemoryCache::new(Duration::from_secs(300));
/// cache.set("search:abc", b"{\"hits\":3}".to_vec(), Duration::ZERO);
/// assert_eq!(cache.get("search:abc").as_deref(), Some(&b"{\"hits\":3}"[..]));
/// cache.close();
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryCache {
    store: Arc<Store>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl MemoryCache {
    /// Default interval between sweeps.
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Create a cache with the default sweep interval.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_sweep_interval(default_ttl, Self::DEFAULT_SWEEP_INTERVAL)
    }

    /// Create a cache using the configured short TTL as default and the
    /// configured sweep interval.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_sweep_interval(
            Duration::from_secs(*config.short_ttl_secs()),
            config.sweep_interval(),
        )
    }

    /// Create a cache that sweeps every `sweep_interval`.
    ///
    /// The sweep task needs a tokio runtime; outside one the cache still works
    /// but expired entries are only dropped lazily.
    #[tracing::instrument]
    pub fn with_sweep_interval(default_ttl: Duration, sweep_interval: Duration) -> Self {
        let store = Arc::new(Store {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        });

        let sweeper = match tokio::runtime::Handle::try_current() {
            Ok(handle) if !sweep_interval.is_zero() => {
                let token = CancellationToken::new();
                let task = sweep_loop(Arc::downgrade(&store), sweep_interval, token.clone());
                Some(Sweeper {
                    token,
                    _handle: handle.spawn(task),
                })
            }
            Ok(_) => None,
            Err(_) => {
                warn!("No tokio runtime available, cache sweeping disabled");
                None
            }
        };

        debug!(sweeping = sweeper.is_some(), "Creating new MemoryCache");
        Self {
            store,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Remove expired entries now. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.store.cleanup_expired()
    }

    /// Default TTL applied when `set` is given zero.
    pub fn default_ttl(&self) -> Duration {
        self.store.default_ttl
    }

    /// Whether the background sweep task is still running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

async fn sweep_loop(store: Weak<Store>, interval: Duration, token: CancellationToken) {
    let interval = interval.min(FAR_FUTURE);
    let mut ticker = tokio::time::interval_at(instant_after(Instant::now(), interval), interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let Some(store) = store.upgrade() else { break };
                store.cleanup_expired();
            }
        }
    }
    debug!("Cache sweeper stopped");
}

impl ResponseCache for MemoryCache {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.store.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.is_expired_at(Instant::now()) {
            debug!("Cache entry expired");
            return None;
        }
        debug!(time_remaining = ?entry.time_remaining(), "Cache hit");
        Some(entry.value.clone())
    }

    #[tracing::instrument(skip(self, value), fields(size = value.len()))]
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let ttl = if ttl.is_zero() {
            self.store.default_ttl
        } else {
            ttl
        };
        let entry = CacheEntry {
            value,
            expires_at: instant_after(Instant::now(), ttl),
        };
        self.store
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);
        debug!("Inserted entry into cache");
    }

    fn delete(&self, key: &str) {
        self.store
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        let mut entries = self.store.entries.write().unwrap_or_else(PoisonError::into_inner);
        let count = entries.len();
        entries.clear();
        info!(cleared = count, "Cleared cache");
    }

    fn len(&self) -> usize {
        self.store
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn close(&self) {
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sweeper) = sweeper {
            sweeper.token.cancel();
            debug!("Stopping cache sweeper");
        }
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        self.close();
    }
}
