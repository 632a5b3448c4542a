//! # roster - Hypermedia Employee Roster Client
//!
//! `roster` navigates a HAL API by relation names instead of hard-coded URLs,
//! loads one page of a collection at a time (every item individually, so each
//! carries its concurrency token), issues guarded mutations, and refreshes the
//! page when the server pushes a change notification.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use roster::prelude::*;
//!
//! let transport = Arc::new(HttpTransport::new("http://localhost:8080/")?);
//! let bus = LocalBus::new();
//! let started = roster::start(transport, &bus, &SessionConfig::default()).await?;
//! if let Some(dispatch) = started.dispatch {
//!     tokio::spawn(dispatch.run());
//! }
//! let state = started.session.snapshot();
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

use std::sync::Arc;

pub use roster_core::{
    AppState, BoxError, BusError, ConcurrencyToken, DenialOrigin, DynHook, FieldDescriptor, Hook,
    HookResult, Link, Links, Message, MessageBus, Method, MutationError, NavigationChain,
    Notification, PageMeta, PageView, RelationStep, Request, ResolveError, Resource, Response,
    RosterError, Schema, Subscription, Topic, Transport,
};

pub use roster_std::{
    bus::LocalBus,
    config::{ConfigError, RefreshMode, SessionConfig, TopicDestinations},
    dispatch::{DispatchLoop, PushSubscriber, SubscriberState},
    loader::CollectionLoader,
    mutation::{Followup, MutationCoordinator},
    refresh::{PushRefreshHook, RefreshStrategy},
    registry::{Registry, RegistryBuilder},
    resolver::Resolved,
    session::Session,
};

#[cfg(feature = "http")]
pub use roster_std::http::HttpTransport;

/// Link following and the item fan-out.
pub mod navigation {
    pub use roster_std::{
        fanout::fetch_details,
        resolver::{fetch, follow_from, get, resolve},
    };
}

/// Standard hook implementations.
pub mod hooks {
    pub use roster_std::hooks::LoggingHook;
}

/// Testing utilities.
pub mod testing {
    pub use roster_std::testing::{MockTransport, RecordingHook, fixtures};
}

/// The dispatch loop [`start`] wires up.
pub type PushDispatch = DispatchLoop<Registry<Notification>>;

/// A mounted session and, in push mode, the loop that feeds it notifications.
pub struct Started<T> {
    /// The session, shared with the refresh hook.
    pub session: Arc<Session<T>>,
    /// `None` in direct mode. Drive it with [`DispatchLoop::run`].
    pub dispatch: Option<PushDispatch>,
}

/// Creates a session, subscribes it to the push topics and mounts it.
///
/// Subscription happens before the first load so that no change published
/// while mounting is missed.
pub async fn start<T, B>(
    transport: Arc<T>,
    bus: &B,
    config: &SessionConfig,
) -> Result<Started<T>, RosterError>
where
    T: Transport,
    B: MessageBus,
{
    let session = Arc::new(Session::new(transport, config));
    let dispatch = match config.refresh {
        RefreshMode::Push => {
            let hooks = RegistryBuilder::<Notification>::new()
                .register(hooks::LoggingHook)
                .register(PushRefreshHook::new(session.clone()))
                .build();
            let mut subscriber = PushSubscriber::new(hooks, config.topics.pairs());
            Some(subscriber.register(bus)?)
        }
        RefreshMode::Direct => None,
    };
    session.mount().await?;
    tracing::info!(relation = %config.relation, refresh = ?config.refresh, "session started");
    Ok(Started { session, dispatch })
}

/// Prelude module - common imports for Roster.
///
/// # Usage
///
/// ```rust,ignore
/// use roster::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AppState, Hook, HookResult, LocalBus, MessageBus, MutationError, Notification,
        RefreshMode, Resource, RosterError, Session, SessionConfig, Topic, Transport, start,
    };

    #[cfg(feature = "http")]
    pub use crate::HttpTransport;

    pub use std::sync::Arc;
}
