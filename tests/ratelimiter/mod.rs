//! Rate limiter tests.
//!
//! - ratelimiter_behavior.rs: window accounting and denial metadata
//! - ratelimiter_store.rs: custom stores and concurrent admission

mod ratelimiter_store;
