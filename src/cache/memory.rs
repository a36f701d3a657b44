use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::Mutex;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => unreachable!(),
};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// In-process cache tier: LRU bounded by `capacity`, entries dropped on read
/// once older than `max_age`.
pub struct MemoryTier<K, V> {
    store: Mutex<LruCache<K, Entry<V>>>,
    max_age: Option<Duration>,
}

impl<K: Hash + Eq, V: Clone> MemoryTier<K, V> {
    pub fn new(capacity: usize, max_age: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            max_age,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut store = self.store.lock().await;
        let expired = match store.get(key) {
            Some(entry) if !self.is_expired(entry) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            store.pop(key);
        }
        None
    }

    pub async fn insert(&self, key: K, value: V) {
        self.store.lock().await.put(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    fn is_expired(&self, entry: &Entry<V>) -> bool {
        self.max_age
            .is_some_and(|max_age| entry.inserted_at.elapsed() >= max_age)
    }
}
