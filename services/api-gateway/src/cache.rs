//! Response Cache
//!
//! In-process TTL cache for upstream payloads. Entries expire a fixed time
//! after insertion and are evicted lazily when looked up past expiry. Size is
//! bounded with least-recently-used eviction.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Source of the current instant, injectable so expiry can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry<V>>> {
        // A poisoned map still holds valid entries.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the cached value if present and unexpired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }

        None
    }

    /// Stores `value` with expiry = now + TTL, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.lock().put(key.into(), CacheEntry { value, expires_at });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(clock: Arc<ManualClock>, max_entries: usize) -> TtlCache<String> {
        TtlCache::new(Duration::from_secs(60), max_entries, clock)
    }

    #[test]
    fn test_hit_within_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock.clone(), 10);

        cache.insert("q=paris", "payload".to_string());
        clock.advance(Duration::from_secs(59));

        assert_eq!(cache.get("q=paris").as_deref(), Some("payload"));
    }

    #[test]
    fn test_expired_entry_is_evicted_on_lookup() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock.clone(), 10);

        cache.insert("q=paris", "payload".to_string());
        clock.advance(Duration::from_secs(60));

        assert_eq!(cache.get("q=paris"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reinsert_refreshes_expiry() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock.clone(), 10);

        cache.insert("k", "old".to_string());
        clock.advance(Duration::from_secs(45));
        cache.insert("k", "new".to_string());
        clock.advance(Duration::from_secs(45));

        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn test_least_recently_used_entry_is_evicted_when_full() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(clock, 2);

        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        // Touch "a" so "b" becomes least recently used.
        assert!(cache.get("a").is_some());
        cache.insert("c", "3".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_zero_capacity_still_holds_one_entry() {
        let cache: TtlCache<u32> =
            TtlCache::new(Duration::from_secs(1), 0, Arc::new(SystemClock));
        cache.insert("k", 7);
        assert_eq!(cache.get("k"), Some(7));
    }
}
