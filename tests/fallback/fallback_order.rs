use std::sync::{Arc, Mutex};
use streamgate_fallback::{AttemptOutcome, FallbackChain};
use streamgate_upstream::{default_candidates, ServerCandidate, TrackType};

fn stream_chain() -> FallbackChain<ServerCandidate> {
    FallbackChain::builder()
        .name("stream")
        .candidates(default_candidates())
        .build()
        .unwrap()
}

#[test]
fn default_order_is_documented_contract() {
    let names: Vec<String> = default_candidates().iter().map(|c| c.to_string()).collect();
    assert_eq!(
        names,
        vec!["hd-1/sub", "hd-2/sub", "hd-1/dub", "mega-cloud/sub", "vidplay/sub"]
    );
}

#[test]
fn preferred_in_list_is_not_tried_twice() {
    let plan = stream_chain().plan(&ServerCandidate::new("hd-1", TrackType::Dub));
    let names: Vec<String> = plan.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        names,
        vec!["hd-1/dub", "hd-1/sub", "hd-2/sub", "mega-cloud/sub", "vidplay/sub"]
    );
}

#[test]
fn preferred_outside_list_goes_first() {
    let plan = stream_chain().plan(&ServerCandidate::new("hd-4", TrackType::Raw));
    assert_eq!(plan.len(), 6);
    assert_eq!(plan[0], ServerCandidate::new("hd-4", TrackType::Raw));
    assert_eq!(&plan[1..], stream_chain().candidates());
}

#[tokio::test]
async fn tries_in_plan_order_until_first_success() {
    let chain = stream_chain();
    let tried = Arc::new(Mutex::new(Vec::new()));
    let t = Arc::clone(&tried);

    let resolved = chain
        .execute(ServerCandidate::new("hd-1", TrackType::Sub), move |candidate| {
            t.lock().unwrap().push(candidate.to_string());
            async move {
                if candidate.name == "mega-cloud" {
                    Ok(format!("{} sources", candidate))
                } else {
                    Err(format!("{} down", candidate.name))
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(resolved.candidate, ServerCandidate::new("mega-cloud", TrackType::Sub));
    assert!(resolved.used_fallback);
    assert_eq!(resolved.value, "mega-cloud/sub sources");
    assert_eq!(
        *tried.lock().unwrap(),
        vec!["hd-1/sub", "hd-2/sub", "hd-1/dub", "mega-cloud/sub"]
    );
    assert_eq!(resolved.attempts.len(), 3);
    assert_eq!(
        resolved.attempts[1].outcome,
        AttemptOutcome::Failed("hd-2 down".to_string())
    );
}

#[tokio::test]
async fn exhaustion_lists_every_candidate_in_order() {
    let chain = stream_chain();
    let err = chain
        .execute(ServerCandidate::new("hd-3", TrackType::Sub), |_| async {
            Err::<(), _>("unreachable")
        })
        .await
        .unwrap_err();

    let tried: Vec<String> = err.tried().map(|c| c.to_string()).collect();
    assert_eq!(
        tried,
        vec![
            "hd-3/sub",
            "hd-1/sub",
            "hd-2/sub",
            "hd-1/dub",
            "mega-cloud/sub",
            "vidplay/sub"
        ]
    );
    assert!(err.to_string().starts_with("all 6 candidate(s) failed"));
}

#[test]
fn duplicate_candidates_are_rejected() {
    let err = FallbackChain::builder()
        .candidates([
            ServerCandidate::new("hd-1", TrackType::Sub),
            ServerCandidate::new("hd-1", TrackType::Sub),
        ])
        .build()
        .unwrap_err();
    assert_eq!(err.field, "candidates");
    assert!(err.reason.contains("hd-1/sub"));
}
