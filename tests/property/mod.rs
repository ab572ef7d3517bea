//! Property-based tests.
//!
//! Invariants that must hold for arbitrary inputs, generated with proptest.

pub mod rate_limiter;
