//! Publish/subscribe registration boundary.
//!
//! The messaging transport owns connection setup and framing. The core only
//! hands it a list of `{destination, callback}` pairs; the callback receives
//! the raw message body.

use crate::error::BusError;
use std::fmt;

type Deliver = Box<dyn Fn(String) + Send + Sync + 'static>;

/// One destination and the callback that receives its messages.
pub struct Subscription {
    destination: String,
    callback: Deliver,
}

impl Subscription {
    /// A subscription delivering every message on `destination` to `callback`.
    pub fn new<F>(destination: impl Into<String>, callback: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            destination: destination.into(),
            callback: Box::new(callback),
        }
    }

    /// The destination subscribed to.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Hands a raw message body to the subscriber.
    pub fn deliver(&self, payload: String) {
        (self.callback)(payload)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

/// A publish/subscribe transport.
pub trait MessageBus: Send + Sync {
    /// Registers every subscription for the lifetime of the connection.
    fn register(&self, subscriptions: Vec<Subscription>) -> Result<(), BusError>;
}

impl<B: MessageBus + ?Sized> MessageBus for &B {
    fn register(&self, subscriptions: Vec<Subscription>) -> Result<(), BusError> {
        B::register(self, subscriptions)
    }
}
