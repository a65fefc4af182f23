//! Time-bound cache of successful lookups.
//!
//! Entries expire lazily: a read past the TTL is a miss, and the stale entry
//! stays in the map until it is overwritten or [`ResultCache::purge_expired`]
//! runs. A single mutex guards the whole map; it is only held for O(1) map
//! operations, never across a network call.

use crate::record::{CanonicalRecord, LookupKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of "now" for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Useful for exercising expiry.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.start + offset
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CanonicalRecord,
    created_at: Instant,
}

pub struct ResultCache {
    entries: Mutex<HashMap<LookupKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // Entries are immutable values, so a poisoned lock still holds a consistent map
    fn lock(&self) -> MutexGuard<'_, HashMap<LookupKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) < self.ttl
    }

    /// Cached record for `key`, or `None` if absent or older than the TTL.
    /// A stale entry is dropped on the way out.
    pub fn get(&self, key: &LookupKey) -> Option<CanonicalRecord> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, now) => Some(entry.value.clone()),
            Some(_) => {
                debug!("Cache entry for '{}' expired", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `record` under `key`, replacing any previous entry
    pub fn put(&self, key: LookupKey, record: CanonicalRecord) {
        let entry = CacheEntry {
            value: record,
            created_at: self.clock.now(),
        };
        self.lock().insert(key, entry);
    }

    /// Number of stored entries, including expired ones not yet read or purged
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop every expired entry and return how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.created_at) < self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Sense;

    const TTL: Duration = Duration::from_secs(3600);

    fn key(word: &str) -> LookupKey {
        LookupKey::normalize(word).unwrap()
    }

    fn record(word: &str, source: &str) -> CanonicalRecord {
        CanonicalRecord {
            word: word.to_string(),
            source: source.to_string(),
            transcription: String::new(),
            senses: vec![Sense {
                part_of_speech: "глаг.".to_string(),
                meanings: vec!["бежать".to_string()],
            }],
            examples: Vec::new(),
            error: None,
        }
    }

    fn cache_with_clock() -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (ResultCache::with_clock(TTL, clock.clone()), clock)
    }

    #[test]
    fn test_get_missing_key() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get(&key("run")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let (cache, _) = cache_with_clock();
        cache.put(key("run"), record("run", "A"));

        assert_eq!(cache.get(&key("run")), Some(record("run", "A")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_fresh_just_before_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put(key("run"), record("run", "A"));

        clock.advance(TTL - Duration::from_millis(1));

        assert!(cache.get(&key("run")).is_some());
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put(key("run"), record("run", "A"));

        clock.advance(TTL);

        // Still stored until something reads it
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("run")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_replaces_and_refreshes() {
        let (cache, clock) = cache_with_clock();
        cache.put(key("run"), record("run", "A"));

        clock.advance(Duration::from_secs(3000));
        cache.put(key("run"), record("run", "B"));
        clock.advance(Duration::from_secs(3000));

        assert_eq!(cache.get(&key("run")), Some(record("run", "B")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let (cache, clock) = cache_with_clock();
        cache.put(key("old"), record("old", "A"));
        clock.advance(Duration::from_secs(3000));
        cache.put(key("new"), record("new", "A"));
        clock.advance(Duration::from_secs(700));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("new")).is_some());
    }

    #[test]
    fn test_clear() {
        let (cache, _) = cache_with_clock();
        cache.put(key("a"), record("a", "A"));
        cache.put(key("b"), record("b", "A"));

        cache.clear();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_independent_instances() {
        let (first, _) = cache_with_clock();
        let (second, _) = cache_with_clock();
        first.put(key("run"), record("run", "A"));

        assert!(second.get(&key("run")).is_none());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(ResultCache::new(TTL));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let word = format!("w{}", (i * 50 + j) % 20);
                        cache.put(key(&word), record(&word, "A"));
                        assert!(cache.get(&key(&word)).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 20);
    }
}
