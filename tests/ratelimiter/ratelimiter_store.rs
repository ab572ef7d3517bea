use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use streamgate_ratelimiter::{
    MemoryRateLimitStore, RateLimitEntry, RateLimitStore, RateLimiter, RateLimiterConfig,
};
use tokio::time::Instant;

/// Counts hits while delegating to the in-memory store.
#[derive(Default)]
struct CountingStore {
    inner: MemoryRateLimitStore,
    hits: AtomicUsize,
}

impl RateLimitStore for CountingStore {
    fn hit(&self, key: &str, now: Instant, window: Duration) -> RateLimitEntry {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.inner.hit(key, now, window)
    }

    fn peek(&self, key: &str) -> Option<RateLimitEntry> {
        self.inner.peek(key)
    }

    fn purge_expired(&self, now: Instant) -> usize {
        self.inner.purge_expired(now)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&self) {
        self.inner.clear()
    }
}

#[tokio::test]
async fn custom_store_receives_every_hit() {
    let store = Arc::new(CountingStore::default());
    let limiter = RateLimiter::new(
        RateLimiterConfig::builder()
            .limit(2)
            .store(store.clone())
            .build()
            .unwrap(),
    );

    for _ in 0..5 {
        limiter.admit("x");
    }
    assert_eq!(store.hits.load(Ordering::SeqCst), 5);
    assert_eq!(store.peek("x").map(|e| e.count), Some(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_admissions_never_exceed_the_limit() {
    let limiter = RateLimiter::new(
        RateLimiterConfig::builder()
            .limit(100)
            .window(Duration::from_secs(60))
            .build()
            .unwrap(),
    );
    let allowed = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let limiter = limiter.clone();
            let allowed = Arc::clone(&allowed);
            tokio::spawn(async move {
                for _ in 0..125 {
                    if limiter.admit("shared").allowed {
                        allowed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(allowed.load(Ordering::SeqCst), 100);
}
