use std::sync::{Arc, Mutex};
use streamgate_fallback::{FallbackChain, FallbackEvent};

#[tokio::test]
async fn events_follow_the_execution() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let all = Arc::clone(&log);
    let fallbacks = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::clone(&fallbacks);
    let exhausted = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&exhausted);

    let chain = FallbackChain::builder()
        .name("events")
        .candidates(["x", "y"])
        .on_event(move |event: &FallbackEvent| {
            let entry = match event {
                FallbackEvent::CandidateFailed { candidate, .. } => format!("failed {}", candidate),
                FallbackEvent::Primary { candidate, .. } => format!("primary {}", candidate),
                FallbackEvent::Fallback { candidate, .. } => format!("fallback {}", candidate),
                FallbackEvent::Exhausted { attempts, .. } => format!("exhausted {}", attempts),
            };
            all.lock().unwrap().push(entry);
        })
        .on_fallback(move |candidate| f.lock().unwrap().push(candidate.to_string()))
        .on_exhausted(move |attempts| e.lock().unwrap().push(attempts))
        .build()
        .unwrap();

    chain
        .execute("x", |c| async move { Ok::<_, String>(c) })
        .await
        .unwrap();
    chain
        .execute("x", |c| async move {
            if c == "x" {
                Err("down".to_string())
            } else {
                Ok(c)
            }
        })
        .await
        .unwrap();
    let _ = chain
        .execute("x", |_| async { Err::<(), _>("down") })
        .await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "primary x",
            "failed x",
            "fallback y",
            "failed x",
            "failed y",
            "exhausted 2"
        ]
    );
    assert_eq!(*fallbacks.lock().unwrap(), vec!["y".to_string()]);
    assert_eq!(*exhausted.lock().unwrap(), vec![2]);
}
