//! Observation hooks for the retrier, cache, rate limiter and fallback chain.
//!
//! Each component defines one event enum and keeps an [`EventListeners`]
//! list of closures in its config. Builders expose typed shortcuts
//! (`on_retry`, `on_hit`, `on_rejected`, ...) that register a closure
//! matching a single variant.
//!
//! ```
//! use std::time::Instant;
//! use streamgate_core::events::{ComponentEvent, EventListeners};
//!
//! #[derive(Debug)]
//! struct Served {
//!     at: Instant,
//! }
//!
//! impl ComponentEvent for Served {
//!     fn kind(&self) -> &'static str {
//!         "served"
//!     }
//!     fn at(&self) -> Instant {
//!         self.at
//!     }
//!     fn component(&self) -> &str {
//!         "home-cache"
//!     }
//! }
//!
//! let mut listeners = EventListeners::new();
//! listeners.on(|event: &Served| println!("{} {}", event.component(), event.kind()));
//! listeners.emit(&Served { at: Instant::now() });
//! ```

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// An event raised by a named component instance.
pub trait ComponentEvent: Send + Sync + fmt::Debug {
    /// Short lowercase tag, e.g. `"retry"`, `"hit"` or `"rejected"`.
    fn kind(&self) -> &'static str;

    fn at(&self) -> Instant;

    /// Configured name of the emitting instance (`"upstream"`, `"catalog"`).
    fn component(&self) -> &str;
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Closures called, in registration order, for every event of type `E`.
///
/// Cloning shares the closures.
pub struct EventListeners<E> {
    callbacks: Vec<Callback<E>>,
}

impl<E> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<E: ComponentEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Registers `f` for every event.
    pub fn on<F>(&mut self, f: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(f));
    }

    /// Calls every listener with `event`.
    ///
    /// A listener that panics is skipped; the rest still run and the request
    /// that raised the event is unaffected.
    pub fn emit(&self, event: &E) {
        for callback in &self.callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    component = event.component(),
                    event = event.kind(),
                    "event listener panicked"
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl<E: ComponentEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListeners({})", self.callbacks.len())
    }
}
