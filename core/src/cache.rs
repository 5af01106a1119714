//! In-process recency cache for final selections.
//!
//! Bounded LRU keyed by (word, config fingerprint); the value is the
//! selection itself, including "no replacement" so pass-throughs are cached
//! too. Capacity 0 disables caching entirely. Never persisted; rebuilt empty
//! each run.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::candidate::Candidate;

pub type CacheKey = (String, u64);

/// Thread-safe LRU over final selections, with hit/miss counters.
pub struct SelectionCache {
    // None when capacity is 0: every lookup recomputes.
    inner: Option<Mutex<LruCache<CacheKey, Option<Candidate>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SelectionCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a selection, refreshing its recency on hit.
    pub fn get(&self, key: &CacheKey) -> Option<Option<Candidate>> {
        let hit = self.inner.as_ref().and_then(|m| {
            m.lock()
                .ok()
                .and_then(|mut cache| cache.get(key).cloned())
        });
        match hit {
            Some(v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(v)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert a selection, evicting the least recently used entry if full.
    pub fn put(&self, key: CacheKey, value: Option<Candidate>) {
        if let Some(m) = &self.inner {
            if let Ok(mut cache) = m.lock() {
                cache.put(key, value);
            }
        }
    }

    /// (hits, misses) since construction.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .and_then(|m| m.lock().ok().map(|c| c.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner
            .as_ref()
            .and_then(|m| m.lock().ok().map(|c| c.cap().get()))
            .unwrap_or(0)
    }
}
