//! Property-Based Tests for the Rate Limiter

use proptest::prelude::*;

use crate::limiter::{RateLimitConfig, RateLimiter};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // No trailing window ever holds more admitted requests than the cap,
    // and admitted requests respect the minimum spacing.
    #[test]
    fn prop_admissions_respect_window_and_interval(
        max_requests in 1usize..6,
        window in 4u64..20,
        interval in 0u64..4,
        gaps in prop::collection::vec(0u64..5_000, 1..60)
    ) {
        let limiter = RateLimiter::new(RateLimitConfig::new(max_requests, window, interval));
        let mut now = 0u64;
        let mut admitted: Vec<u64> = Vec::new();

        for gap in gaps {
            now += gap;
            let predicted_wait = limiter.wait_time_at("u", now);
            let ok = limiter.can_make_request_at("u", now);
            prop_assert_eq!(ok, predicted_wait == 0.0, "wait time must predict admission");

            if ok {
                if let Some(&last) = admitted.last() {
                    prop_assert!(now - last >= interval * 1000);
                }
                admitted.push(now);
                let in_window = admitted
                    .iter()
                    .filter(|&&t| now - t < window * 1000)
                    .count();
                prop_assert!(in_window <= max_requests);
            }
        }
    }
}
