//! Property tests for the per-client limiter.
//!
//! Invariants tested:
//! - No client is admitted more than `limit` times in one window
//! - `remaining` counts down to zero and never underflows
//! - Clients never share budget

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use streamgate_ratelimiter::{RateLimiter, RateLimiterConfig};

fn limiter(limit: u64) -> RateLimiter {
    RateLimiter::new(
        RateLimiterConfig::builder()
            .limit(limit)
            .window(Duration::from_secs(3600))
            .build()
            .unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn single_client_respects_limit(limit in 1u64..=50, requests in 1usize..=200) {
        let limiter = limiter(limit);
        let mut admitted = 0u64;
        let mut last_remaining = limit;

        for _ in 0..requests {
            let admission = limiter.admit("client");
            prop_assert_eq!(admission.limit, limit);
            prop_assert!(admission.remaining <= last_remaining);
            last_remaining = admission.remaining;
            if admission.allowed {
                admitted += 1;
                prop_assert_eq!(admission.remaining, limit - admitted);
            } else {
                prop_assert_eq!(admission.remaining, 0);
                prop_assert!(admission.reset_seconds >= 1);
            }
        }

        prop_assert_eq!(admitted, limit.min(requests as u64));
    }

    #[test]
    fn clients_have_separate_budgets(
        limit in 1u64..=10,
        sequence in prop::collection::vec(0usize..5, 1..200),
    ) {
        let limiter = limiter(limit);
        let mut admitted: HashMap<usize, u64> = HashMap::new();
        let mut sent: HashMap<usize, u64> = HashMap::new();

        for client in sequence {
            *sent.entry(client).or_default() += 1;
            if limiter.admit(&format!("10.0.0.{}", client)).allowed {
                *admitted.entry(client).or_default() += 1;
            }
        }

        for (client, sent) in &sent {
            let got = admitted.get(client).copied().unwrap_or(0);
            prop_assert_eq!(got, limit.min(*sent));
        }
        prop_assert_eq!(limiter.client_count(), sent.len());
    }
}
