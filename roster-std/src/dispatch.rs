//! Push subscription and the notification dispatch loop.
//!
//! Registration turns every `(topic, destination)` pair into a bus
//! subscription whose callback feeds a dedicated channel. The receivers are
//! merged into one stream, drained by a single [`DispatchLoop`] that hands
//! each notification to the hook, one at a time.

use futures::{
    StreamExt,
    channel::mpsc::{self, UnboundedReceiver},
    stream::SelectAll,
};
use roster_core::{
    BoxError, BusError, Hook, HookResult, MessageBus, Notification, Subscription, Topic,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifecycle of a [`PushSubscriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Not subscribed yet.
    Unregistered,
    /// Subscribed for the rest of its lifetime.
    Registered,
}

/// Subscribes a hook to the push topics.
pub struct PushSubscriber<H> {
    hook: Arc<H>,
    destinations: Vec<(Topic, String)>,
    state: SubscriberState,
}

impl<H: Hook<Notification>> PushSubscriber<H> {
    /// A subscriber delivering each `(topic, destination)` pair to `hook`.
    pub fn new(hook: H, destinations: Vec<(Topic, String)>) -> Self {
        Self {
            hook: Arc::new(hook),
            destinations,
            state: SubscriberState::Unregistered,
        }
    }

    /// Where the subscriber is in its lifecycle.
    pub fn state(&self) -> SubscriberState {
        self.state
    }

    /// Registers one subscription per destination with `bus`.
    ///
    /// Registration happens once; a second call fails with
    /// [`BusError::AlreadyRegistered`].
    pub fn register<B: MessageBus>(&mut self, bus: &B) -> Result<DispatchLoop<H>, BusError> {
        if self.state == SubscriberState::Registered {
            return Err(BusError::AlreadyRegistered);
        }
        for (index, (_, destination)) in self.destinations.iter().enumerate() {
            if self.destinations[..index].iter().any(|(_, d)| d == destination) {
                return Err(BusError::DuplicateDestination(destination.clone()));
            }
        }

        let mut inbox = SelectAll::new();
        let mut subscriptions = Vec::with_capacity(self.destinations.len());
        for (topic, destination) in &self.destinations {
            let (sender, receiver) = mpsc::unbounded();
            let topic = *topic;
            subscriptions.push(Subscription::new(destination.clone(), move |payload| {
                if sender.unbounded_send(Notification::new(topic, payload)).is_err() {
                    debug!(%topic, "dispatch loop gone, dropping notification");
                }
            }));
            inbox.push(receiver);
        }

        bus.register(subscriptions)?;
        self.state = SubscriberState::Registered;
        debug!(topics = self.destinations.len(), "push subscriber registered");
        Ok(DispatchLoop {
            inbox,
            hook: self.hook.clone(),
        })
    }
}

/// Drains every topic channel into the hook, sequentially.
pub struct DispatchLoop<H> {
    inbox: SelectAll<UnboundedReceiver<Notification>>,
    hook: Arc<H>,
}

impl<H: Hook<Notification>> DispatchLoop<H> {
    /// Waits for the next notification and dispatches it.
    ///
    /// Returns `None` once every subscription has been dropped by the bus.
    pub async fn dispatch_next(&mut self) -> Option<Result<HookResult, BoxError>> {
        let notification = self.inbox.next().await?;
        debug!(topic = %notification.topic, "dispatching notification");
        Some(self.hook.on_event(&notification).await)
    }

    /// Runs until the bus drops every subscription.
    ///
    /// A failed refresh is logged and does not stop the loop.
    pub async fn run(mut self) {
        while let Some(outcome) = self.dispatch_next().await {
            if let Err(error) = outcome {
                warn!(%error, "notification handling failed");
            }
        }
        debug!("dispatch loop finished");
    }
}
