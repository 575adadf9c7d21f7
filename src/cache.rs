use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::StorageError;
use crate::models::Post;

pub const POSTS_KEY: &str = "blogger_posts_cache";
pub const TIMESTAMP_KEY: &str = "blogger_posts_cache_timestamp";

/// String key/value store scoped to one session.
/// Nothing written here outlives the process.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory session storage. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        items.remove(key);
        Ok(())
    }
}

/// Source of "now" for cache ageing
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { millis: Arc::new(AtomicI64::new(start.timestamp_millis())) }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }
}

/// Freshness-bounded snapshot of the last fetched posts.
/// Reads and writes never fail: storage trouble is logged and treated as a
/// miss (read) or a no-op (write).
pub struct PostCache<S, C = SystemClock> {
    storage: S,
    clock: C,
    max_age: Duration,
}

impl<S: SessionStorage> PostCache<S, SystemClock> {
    pub fn new(storage: S, max_age: Duration) -> Self {
        Self::with_clock(storage, SystemClock, max_age)
    }
}

impl<S: SessionStorage, C: Clock> PostCache<S, C> {
    pub fn with_clock(storage: S, clock: C, max_age: Duration) -> Self {
        Self { storage, clock, max_age }
    }

    /// Returns the cached posts if they are younger than the freshness window.
    /// A stale snapshot is cleared.
    pub fn read(&self) -> Option<Vec<Post>> {
        match self.try_read() {
            Ok(posts) => posts,
            Err(e) => {
                error!("Error reading cache: {}", e);
                None
            }
        }
    }

    fn try_read(&self) -> Result<Option<Vec<Post>>, StorageError> {
        let posts = self.storage.get_item(POSTS_KEY)?;
        let timestamp = self.storage.get_item(TIMESTAMP_KEY)?;

        let (posts, timestamp) = match (posts, timestamp) {
            (Some(p), Some(t)) => (p, t),
            _ => return Ok(None),
        };

        let captured_ms: i64 = timestamp.trim().parse()
            .map_err(|_| StorageError::Corrupt(format!("bad timestamp {:?}", timestamp)))?;
        let age_ms = self.clock.now().timestamp_millis() - captured_ms;

        if age_ms < self.max_age.as_millis() as i64 {
            let posts: Vec<Post> = serde_json::from_str(&posts)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            debug!("Cache hit: {} posts, {}ms old", posts.len(), age_ms);
            return Ok(Some(posts));
        }

        debug!("Cache expired after {}ms", age_ms);
        self.invalidate();
        Ok(None)
    }

    /// Stores `posts` stamped with the current time
    pub fn write(&self, posts: &[Post]) {
        if let Err(e) = self.try_write(posts) {
            error!("Error caching posts: {}", e);
        }
    }

    fn try_write(&self, posts: &[Post]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(posts)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.storage.set_item(POSTS_KEY, &serialized)?;
        self.storage.set_item(TIMESTAMP_KEY, &self.clock.now().timestamp_millis().to_string())?;
        Ok(())
    }

    /// Removes both the posts and their timestamp
    pub fn invalidate(&self) {
        for key in [POSTS_KEY, TIMESTAMP_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                warn!("Failed to clear cache key {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
pub(crate) mod tests;
