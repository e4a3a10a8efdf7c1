use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Thread-safe LRU cache of query embeddings.
///
/// Keys are hashes of the whitespace-normalized query, so `"Barbie  dolls"`
/// and `"Barbie dolls"` share an entry. Case is folded only when the
/// embedding model is uncased.
#[derive(Clone)]
pub struct QueryVectorCache {
    cache: Arc<Mutex<LruCache<u64, Arc<Vec<f32>>>>>,
    fold_case: bool,
}

impl QueryVectorCache {
    /// Returns `None` when `capacity` is zero, which disables caching.
    pub fn new(capacity: usize, fold_case: bool) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            fold_case,
        })
    }

    pub fn key(&self, query: &str) -> u64 {
        let mut normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.fold_case {
            normalized = normalized.to_lowercase();
        }
        let mut hasher = DefaultHasher::new();
        normalized.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, query: &str) -> Option<Arc<Vec<f32>>> {
        let key = self.key(query);
        // Entries are never left half-written, so a poisoned lock is recoverable.
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(&key).cloned()
    }

    pub fn put(&self, query: &str, vector: Arc<Vec<f32>>) {
        let key = self.key(query);
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(key, vector);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
