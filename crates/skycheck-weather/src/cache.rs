//! In-memory weather cache keyed by location.
//!
//! Entries expire lazily: nothing sweeps the map, a stale entry is only
//! removed when a `get` for the same key notices it has aged out.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::types::WeatherRecord;

/// How long a cached lookup stays fresh.
pub const DEFAULT_MAX_AGE_MS: i64 = 10_000;

/// Records for one location together with the time they were stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    records: Vec<WeatherRecord>,
    stored_at: i64,
}

/// Thread-safe read-through cache for weather lookups.
///
/// A single lock guards every key, so `get` and `put` are totally ordered.
pub struct WeatherCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
    max_age_ms: i64,
}

impl std::fmt::Debug for WeatherCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherCache")
            .field("entries", &self.entries.lock().len())
            .field("max_age_ms", &self.max_age_ms)
            .finish()
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherCache {
    /// Cache using the system clock and the default max age.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), DEFAULT_MAX_AGE_MS)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, max_age_ms: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            max_age_ms: max_age_ms.max(0),
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms.unsigned_abs())
    }

    /// Look up cached records for `location`.
    ///
    /// Returns `None` for an empty key, an unknown key, or an entry older
    /// than the max age. An aged-out entry is removed.
    pub fn get(&self, location: &str) -> Option<Vec<WeatherRecord>> {
        if location.is_empty() {
            return None;
        }

        let mut entries = self.entries.lock();
        let Some(entry) = entries.get(location) else {
            tracing::debug!("Location {} not found in cache", location);
            return None;
        };

        let now = self.clock.now_millis();
        // Strict: an entry exactly max_age old is still fresh.
        if now.saturating_sub(self.max_age_ms) > entry.stored_at {
            tracing::debug!("Location {} has aged out of cache", location);
            entries.remove(location);
            return None;
        }

        tracing::debug!("Location {} found in cache", location);
        Some(entry.records.clone())
    }

    /// Store `records` for `location`, replacing whatever was there.
    ///
    /// An empty location is never stored.
    pub fn put(&self, location: &str, records: Vec<WeatherRecord>) {
        if location.is_empty() {
            return;
        }
        let stored_at = self.clock.now_millis();
        self.entries
            .lock()
            .insert(location.to_string(), CacheEntry { records, stored_at });
    }

    /// Number of entries held, including stale ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
