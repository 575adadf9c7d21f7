use super::*;
use chrono::TimeZone;

const WINDOW: Duration = Duration::from_secs(30 * 60);

fn create_test_cache() -> (PostCache<MemoryStorage, ManualClock>, MemoryStorage, ManualClock) {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
    let cache = PostCache::with_clock(storage.clone(), clock.clone(), WINDOW);
    (cache, storage, clock)
}

fn create_test_posts() -> Vec<Post> {
    vec![
        Post {
            title: "Test Post 1".to_string(),
            published: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            content: "<p>Post 1 content</p>".to_string(),
            url: "https://example.com/post1.html".to_string(),
            categories: vec!["Rust".to_string(), "Rust".to_string()],
            author: "Test Author".to_string(),
        },
        Post {
            title: "Test Post 2".to_string(),
            published: Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap(),
            content: String::new(),
            url: "#".to_string(),
            categories: vec![],
            author: "Test Author".to_string(),
        },
    ]
}

/// Storage whose every operation fails
pub(crate) struct BrokenStorage;

impl SessionStorage for BrokenStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }
}

#[test]
fn test_empty_cache_is_miss() {
    let (cache, _storage, _clock) = create_test_cache();
    assert!(cache.read().is_none());
}

#[test]
fn test_round_trip_within_window() {
    let (cache, storage, clock) = create_test_cache();
    let posts = create_test_posts();

    cache.write(&posts);
    assert_eq!(storage.len(), 2);

    // Just inside the window
    clock.advance(WINDOW - Duration::from_millis(1));
    assert_eq!(cache.read(), Some(posts));
}

#[test]
fn test_stale_entry_is_cleared() {
    let (cache, storage, clock) = create_test_cache();
    cache.write(&create_test_posts());

    // Age equal to the window is already stale
    clock.advance(WINDOW);
    assert!(cache.read().is_none());
    assert!(storage.is_empty());
}

#[test]
fn test_timestamp_is_stored_in_millis() {
    let (cache, storage, clock) = create_test_cache();
    cache.write(&create_test_posts());

    let stamp = storage.get_item(TIMESTAMP_KEY).unwrap().unwrap();
    assert_eq!(stamp, clock.now().timestamp_millis().to_string());
}

#[test]
fn test_missing_half_is_miss() {
    let (cache, storage, _clock) = create_test_cache();
    cache.write(&create_test_posts());

    storage.remove_item(TIMESTAMP_KEY).unwrap();
    assert!(cache.read().is_none());
}

#[test]
fn test_corrupt_data_is_miss() {
    let (cache, storage, _clock) = create_test_cache();
    cache.write(&create_test_posts());

    storage.set_item(POSTS_KEY, "{not json").unwrap();
    assert!(cache.read().is_none());

    cache.write(&create_test_posts());
    storage.set_item(TIMESTAMP_KEY, "yesterday").unwrap();
    assert!(cache.read().is_none());
}

#[test]
fn test_invalidate_removes_both_keys() {
    let (cache, storage, _clock) = create_test_cache();
    cache.write(&create_test_posts());

    cache.invalidate();
    assert!(storage.get_item(POSTS_KEY).unwrap().is_none());
    assert!(storage.get_item(TIMESTAMP_KEY).unwrap().is_none());
}

#[test]
fn test_broken_storage_never_panics() {
    let cache = PostCache::new(BrokenStorage, WINDOW);

    cache.write(&create_test_posts());
    assert!(cache.read().is_none());
    cache.invalidate();
}
