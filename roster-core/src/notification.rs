//! Push notifications and the message marker trait.

use std::fmt;

/// A marker trait for values that travel through hooks.
///
/// Messages must be `Send + Sync + 'static` to be safe for async use.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Everything delivered to a hook must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl Message for () {}
impl Message for String {}
impl<T: Message> Message for std::sync::Arc<T> {}

/// The data-changing events the server broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// An item was added to the collection.
    ItemCreated,
    /// An item was changed.
    ItemUpdated,
    /// An item was removed.
    ItemDeleted,
}

impl Topic {
    /// Every topic, in subscription order.
    pub const ALL: [Topic; 3] = [Topic::ItemCreated, Topic::ItemUpdated, Topic::ItemDeleted];

    /// The topic's wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Topic::ItemCreated => "item-created",
            Topic::ItemUpdated => "item-updated",
            Topic::ItemDeleted => "item-deleted",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound push notification.
///
/// The payload is carried for logging only; refresh decisions use the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// What changed.
    pub topic: Topic,
    /// The raw message body.
    pub payload: String,
}

impl Notification {
    /// A notification on `topic`.
    pub fn new(topic: Topic, payload: impl Into<String>) -> Self {
        Self {
            topic,
            payload: payload.into(),
        }
    }
}

impl Message for Notification {}
