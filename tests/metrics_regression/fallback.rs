use super::helpers::*;
use serial_test::serial;
use streamgate_fallback::FallbackChain;

fn chain(name: &str) -> FallbackChain<&'static str> {
    FallbackChain::builder()
        .name(name)
        .candidates(["hd-1", "hd-2"])
        .build()
        .unwrap()
}

#[tokio::test]
#[serial]
async fn fallback_outcome_metrics() {
    init_recorder();

    let chain = chain("metrics_fallback");
    let _ = chain
        .execute("hd-1", |c| async move { Ok::<_, String>(c) })
        .await;
    let _ = chain
        .execute("hd-1", |c| async move {
            if c == "hd-2" {
                Ok(c)
            } else {
                Err("down".to_string())
            }
        })
        .await;
    let _ = chain
        .execute("hd-1", |_| async { Err::<(), _>("down".to_string()) })
        .await;

    assert_counter_exists("fallback_calls_total");
    for result in ["primary", "fallback", "exhausted"] {
        assert_metric_has_labels(
            "fallback_calls_total",
            &[("fallback", "metrics_fallback"), ("result", result)],
        );
    }
}
