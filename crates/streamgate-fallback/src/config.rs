//! Configuration for the fallback chain.

use crate::FallbackEvent;
use std::fmt;
use streamgate_core::events::EventListeners;
use streamgate_core::ConfigError;

/// A named, ordered, read-only list of alternate candidates.
pub struct FallbackConfig<C> {
    pub(crate) name: String,
    pub(crate) candidates: Vec<C>,
    pub(crate) event_listeners: EventListeners<FallbackEvent>,
}

impl<C> FallbackConfig<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The alternates, in the order they are tried after the preferred one.
    pub fn candidates(&self) -> &[C] {
        &self.candidates
    }
}

/// Builder for [`FallbackChain`](crate::FallbackChain).
pub struct FallbackChainBuilder<C> {
    name: String,
    candidates: Vec<C>,
    event_listeners: EventListeners<FallbackEvent>,
}

impl<C> Default for FallbackChainBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FallbackChainBuilder<C> {
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            candidates: Vec::new(),
            event_listeners: EventListeners::new(),
        }
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Appends one alternate.
    pub fn candidate(mut self, candidate: C) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Appends alternates in order.
    pub fn candidates<I>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        self.candidates.extend(candidates);
        self
    }

    /// Adds a listener for every chain event.
    pub fn on_event<F>(mut self, listener: F) -> Self
    where
        F: Fn(&FallbackEvent) + Send + Sync + 'static,
    {
        self.event_listeners.on(listener);
        self
    }

    /// Called with the candidate that served the result when it was not the
    /// preferred one.
    pub fn on_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let FallbackEvent::Fallback { candidate, .. } = event {
                f(candidate);
            }
        });
        self
    }

    /// Called with the number of candidates tried when all of them failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.on(move |event| {
            if let FallbackEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        });
        self
    }

    /// Builds the chain. A candidate listed twice is rejected.
    pub fn build(self) -> Result<crate::FallbackChain<C>, ConfigError>
    where
        C: PartialEq + fmt::Display,
    {
        for (i, candidate) in self.candidates.iter().enumerate() {
            if self.candidates[..i].contains(candidate) {
                return Err(ConfigError::new(
                    "candidates",
                    format!("`{}` is listed more than once", candidate),
                ));
            }
        }

        Ok(crate::FallbackChain::new(FallbackConfig {
            name: self.name,
            candidates: self.candidates,
            event_listeners: self.event_listeners,
        }))
    }
}
