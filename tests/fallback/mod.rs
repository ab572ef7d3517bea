//! Fallback chain tests.
//!
//! - fallback_order.rs: candidate ordering and the attempt log
//! - fallback_isolation.rs: errors, unusable values and panics are contained
//! - fallback_events.rs: listener callbacks

mod fallback_events;
mod fallback_order;
