//! In-process message bus.
//!
//! Stands in for the socket transport when the server and the client share a
//! process, and in tests: published messages are fanned out to every
//! subscription registered on the destination.

use roster_core::{BusError, MessageBus, Subscription};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::trace;

/// A destination-keyed fan-out bus. Clones share the same routes.
#[derive(Clone, Default)]
pub struct LocalBus {
    routes: Arc<Mutex<HashMap<String, Vec<Subscription>>>>,
}

impl LocalBus {
    /// A bus with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `payload` to every subscription on `destination`.
    ///
    /// Returns the number of subscriptions reached.
    pub fn publish(&self, destination: &str, payload: impl Into<String>) -> usize {
        let payload = payload.into();
        let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(subscriptions) = routes.get(destination) else {
            trace!(destination, "no subscribers");
            return 0;
        };
        for subscription in subscriptions {
            subscription.deliver(payload.clone());
        }
        subscriptions.len()
    }

    /// Number of subscriptions on `destination`.
    pub fn subscribers(&self, destination: &str) -> usize {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(destination)
            .map_or(0, Vec::len)
    }
}

impl MessageBus for LocalBus {
    fn register(&self, subscriptions: Vec<Subscription>) -> Result<(), BusError> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        for subscription in subscriptions {
            routes
                .entry(subscription.destination().to_owned())
                .or_default()
                .push(subscription);
        }
        Ok(())
    }
}
