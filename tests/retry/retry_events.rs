use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use streamgate_retry::{Retrier, RetryConfig};

#[tokio::test(start_paused = true)]
async fn on_retry_reports_attempt_and_delay() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);

    let retrier: Retrier<String> = RetryConfig::builder()
        .max_attempts(3)
        .base_delay(Duration::from_millis(500))
        .on_retry(move |attempt, delay| s.lock().unwrap().push((attempt, delay)))
        .build()
        .unwrap()
        .into();

    let _ = retrier
        .run("op", || async { Err::<(), _>("boom".to_string()) })
        .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (1, Duration::from_millis(500)),
            (2, Duration::from_millis(1000)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn success_and_exhaustion_fire_once() {
    let successes = Arc::new(Mutex::new(Vec::new()));
    let exhausted = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&successes);
    let e = Arc::clone(&exhausted);

    let retrier: Retrier<String> = RetryConfig::builder()
        .max_attempts(2)
        .base_delay(Duration::from_millis(1))
        .on_success(move |attempts| s.lock().unwrap().push(attempts))
        .on_exhausted(move |attempts| e.lock().unwrap().push(attempts))
        .build()
        .unwrap()
        .into();

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    retrier
        .run("second-time-lucky", move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("flaky".to_string())
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

    let _ = retrier
        .run("never", || async { Err::<(), _>("down".to_string()) })
        .await;

    assert_eq!(*successes.lock().unwrap(), vec![2]);
    assert_eq!(*exhausted.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn on_ignored_fires_for_rejected_errors() {
    let ignored = Arc::new(AtomicUsize::new(0));
    let i = Arc::clone(&ignored);

    let retrier: Retrier<u16> = RetryConfig::builder()
        .retry_on(|status: &u16| *status >= 500)
        .on_ignored(move || {
            i.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
        .into();

    let err = retrier.run("status", || async { Err::<(), _>(404u16) }).await;
    assert!(err.is_err());
    assert_eq!(ignored.load(Ordering::SeqCst), 1);
}
