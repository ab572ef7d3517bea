//! Per-key registry of in-flight computations.

use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

type Outcome<E> = Result<Bytes, E>;

pub(crate) struct InFlight<E> {
    requests: Mutex<HashMap<String, broadcast::Sender<Outcome<E>>>>,
}

/// What a caller should do after registering interest in a key.
pub(crate) enum Role<E> {
    /// Compute the value and publish it through the guard.
    Leader(LeaderGuard<E>),
    /// Wait for the current leader's outcome.
    Waiter(broadcast::Receiver<Outcome<E>>),
    /// A value appeared while joining; use it.
    Ready(Bytes),
}

impl<E: Clone> InFlight<E> {
    pub(crate) fn new() -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Joins the computation for `key`, becoming its leader if none is
    /// running.
    ///
    /// `recheck` runs under the registry lock before a new leader is
    /// elected. A leader stores its value before releasing the key, so a
    /// value found here means a computation finished between the caller's
    /// first lookup and this call.
    pub(crate) fn join<F>(self: &Arc<Self>, key: &str, recheck: F) -> Role<E>
    where
        F: FnOnce() -> Option<Bytes>,
    {
        let mut requests = self.requests.lock();
        if let Some(sender) = requests.get(key) {
            return Role::Waiter(sender.subscribe());
        }
        if let Some(bytes) = recheck() {
            return Role::Ready(bytes);
        }
        // a single value is ever sent per channel
        let (tx, _rx) = broadcast::channel(1);
        requests.insert(key.to_string(), tx);
        Role::Leader(LeaderGuard {
            key: Some(key.to_string()),
            in_flight: Arc::clone(self),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.lock().len()
    }
}

/// Held by the computing caller.
///
/// Dropping it without calling [`complete`](Self::complete) (the leader was
/// cancelled) releases the key with no outcome; waiters then see a closed
/// channel and race to become the next leader.
pub(crate) struct LeaderGuard<E> {
    key: Option<String>,
    in_flight: Arc<InFlight<E>>,
}

impl<E> LeaderGuard<E> {
    pub(crate) fn complete(mut self, outcome: Outcome<E>) {
        if let Some(key) = self.key.take() {
            let mut requests = self.in_flight.requests.lock();
            if let Some(sender) = requests.remove(&key) {
                // no receivers is fine
                let _ = sender.send(outcome);
            }
        }
    }
}

impl<E> Drop for LeaderGuard<E> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.in_flight.requests.lock().remove(&key);
        }
    }
}
