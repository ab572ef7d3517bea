//! Retrier tests.
//!
//! Test organization:
//! - retry_behavior.rs: attempt counting, backoff timing, timeouts, predicates
//! - retry_events.rs: listener callbacks
//! - retry_config.rs: builder validation

mod retry_events;
