//! # roster-core
//!
//! Core types and traits for the Roster hypermedia client.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! transports and embedders that don't need the `roster-std` implementations.
//!
//! # Layers
//!
//! ## Resource model ([`Resource`], [`Links`], [`PageMeta`])
//!
//! An immutable view over one fetched HAL representation: its body, its named
//! outbound links, its embedded children and, for individually fetched items,
//! the [`ConcurrencyToken`] the server attached.
//!
//! ## Navigation ([`RelationStep`], [`NavigationChain`])
//!
//! A chain of relation descriptors describing a path through the link graph,
//! starting at the API root.
//!
//! ## Boundaries ([`Transport`], [`MessageBus`])
//!
//! The two external collaborators: the HTTP request function and the
//! publish/subscribe registration call.
//!
//! ## Notification handling ([`Hook`])
//!
//! Push notifications are delivered to hooks, which decide whether to keep
//! propagating a notification (`Next`) or swallow it (`Stop`).
//!
//! # Error Types
//!
//! - [`RosterError`] - Top-level error type
//! - [`ResolveError`] - Link following and fetch errors
//! - [`MutationError`] - Create/update/delete failures
//! - [`BusError`] - Subscription registration errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bus;
mod error;
mod hook;
mod notification;
mod relation;
mod resource;
mod schema;
mod state;
mod transport;

// Re-exports
pub use bus::{MessageBus, Subscription};
pub use error::{BoxError, BusError, DenialOrigin, MutationError, ResolveError, RosterError};
pub use hook::{DynHook, Hook, HookResult};
pub use notification::{Message, Notification, Topic};
pub use relation::{NavigationChain, QueryParams, RelationStep};
pub use resource::{ConcurrencyToken, Link, Links, PageMeta, Resource};
pub use schema::{FieldDescriptor, Schema, SchemaError};
pub use state::{AppState, PageView};
pub use transport::{Method, Request, Response, Transport, header, media};
