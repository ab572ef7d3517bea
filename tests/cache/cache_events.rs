use std::sync::{Arc, Mutex};
use std::time::Duration;
use streamgate_cache::{CacheConfig, TtlCache};
use streamgate_core::ApiError;

#[tokio::test(start_paused = true)]
async fn hit_and_miss_listeners_see_keys() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let hits = Arc::clone(&log);
    let misses = Arc::clone(&log);

    let cache: TtlCache<ApiError> = TtlCache::new(
        CacheConfig::builder()
            .on_hit(move |key| hits.lock().unwrap().push(format!("hit {}", key)))
            .on_miss(move |key| misses.lock().unwrap().push(format!("miss {}", key)))
            .build()
            .unwrap(),
    );

    for _ in 0..2 {
        cache
            .with_cache("home", Duration::from_secs(60), || async {
                Ok::<_, ApiError>(1)
            })
            .await
            .unwrap();
    }

    assert_eq!(*log.lock().unwrap(), vec!["miss home", "hit home"]);
}

#[tokio::test(start_paused = true)]
async fn eviction_listener_reports_least_recently_used() {
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&evicted);

    let cache: TtlCache<ApiError> = TtlCache::new(
        CacheConfig::builder()
            .max_entries(2)
            .on_eviction(move |key| e.lock().unwrap().push(key.to_string()))
            .build()
            .unwrap(),
    );

    let ttl = Duration::from_secs(60);
    cache.insert("a", &1, ttl).unwrap();
    cache.insert("b", &2, ttl).unwrap();
    assert_eq!(cache.get::<i32>("a"), Some(1));
    cache.insert("c", &3, ttl).unwrap();

    assert_eq!(*evicted.lock().unwrap(), vec!["b".to_string()]);
    assert_eq!(cache.len(), 2);
}
