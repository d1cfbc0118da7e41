//! Time-boxed in-memory caches shared by the upstream service adapters.
//!
//! Each cache has a fixed time-to-live and is keyed by request parameters, so
//! distinct requests never overwrite each other. A stale entry is replaced
//! wholesale by the next `put` for the same key.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of the current time.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to test expiry.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
struct StoredEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Key/value cache whose entries expire `ttl` after they were written.
#[derive(Debug)]
pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, StoredEntry<V>>>,
}

impl<V: Clone + Debug> TtlCache<V> {
    /// Create a cache backed by the wall clock.
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self::with_clock(name, ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A poisoned lock only means another thread panicked mid-insert; the map
    // itself is still usable.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, StoredEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores a value, replacing any previous entry for the key.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value), fields(cache = self.name))]
    pub fn put(&self, key: &str, value: V) {
        let entry = StoredEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries().insert(key.to_string(), entry);
    }

    /// Retrieves a value if it exists and has not expired.
    /// Expired entries are evicted and reported as a miss.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self), fields(cache = self.name))]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries();

        match entries.get(key) {
            Some(entry) if now - entry.stored_at < self.ttl => {
                tracing::debug!("Key found and still fresh");
                Some(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!("Key found but expired");
                entries.remove(key);
                None
            }
            None => {
                tracing::debug!("Key not found");
                None
            }
        }
    }

    /// Manually removes a key from the cache.
    pub fn remove(&self, key: &str) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
