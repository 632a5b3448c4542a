//! # Notification hooks
//!
//! Hooks are the unit that reacts to a push notification. The refresh policy
//! is a hook; so is the logging observer. Several hooks run in registration
//! order, each deciding whether the next one should see the message.

use crate::{error::BoxError, notification::Message};
use std::{future::Future, pin::Pin, sync::Arc};

/// Whether propagation continues after a hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// Let the next hook see the message.
    Next,
    /// The message was fully handled.
    Stop,
}

/// Reacts to one message.
///
/// This trait uses native `async fn` for static dispatch. Collections of
/// heterogeneous hooks use [`DynHook`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Hook<{E}>`",
    label = "missing `Hook` implementation",
    note = "Hooks must implement `on_event` for the message type `{E}`."
)]
pub trait Hook<E: Message>: Send + Sync + 'static {
    /// Called once per delivered message.
    fn on_event(&self, event: &E) -> impl Future<Output = Result<HookResult, BoxError>> + Send;
}

/// Object-safe form of [`Hook`].
pub trait DynHook<E: Message>: Send + Sync + 'static {
    /// Called once per delivered message (dynamic dispatch version).
    fn on_event_dyn<'a>(
        &'a self,
        event: &'a E,
    ) -> Pin<Box<dyn Future<Output = Result<HookResult, BoxError>> + Send + 'a>>;
}

impl<E: Message, T: Hook<E>> DynHook<E> for T {
    fn on_event_dyn<'a>(
        &'a self,
        event: &'a E,
    ) -> Pin<Box<dyn Future<Output = Result<HookResult, BoxError>> + Send + 'a>> {
        Box::pin(self.on_event(event))
    }
}

impl<E: Message, H: Hook<E>> Hook<E> for Arc<H> {
    fn on_event(&self, event: &E) -> impl Future<Output = Result<HookResult, BoxError>> + Send {
        H::on_event(self, event)
    }
}
