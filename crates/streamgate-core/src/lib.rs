//! Core infrastructure for streamgate.
//!
//! This crate provides the pieces shared by every streamgate component:
//! - Event system for observability ([`events`])
//! - The caller-facing failure taxonomy ([`ErrorKind`], [`ApiError`]) and
//!   builder validation errors ([`ConfigError`])
//! - The success/error response envelope ([`ApiResponse`])
//! - Fixed-interval background sweeps for in-memory stores ([`sweeper`])

pub mod envelope;
pub mod error;
pub mod events;
pub mod sweeper;

pub use envelope::ApiResponse;
pub use error::{ApiError, ConfigError, ErrorKind};
pub use events::{ComponentEvent, EventListeners};
pub use sweeper::{spawn_sweeper, SweeperHandle};
