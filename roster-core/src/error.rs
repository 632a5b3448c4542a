//! Error types for Roster.
//!
//! - [`RosterError`] - Top-level error type for all Roster operations
//! - [`ResolveError`] - Errors while following links or fetching resources
//! - [`MutationError`] - Errors from create, update and delete
//! - [`BusError`] - Errors while registering push subscriptions

use crate::{schema::SchemaError, transport::Method};
use thiserror::Error;

/// A boxed error type for transport-level failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Roster operations.
#[derive(Error, Debug)]
pub enum RosterError {
    /// Link following or fetching failed.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// A mutation was rejected.
    #[error("mutation error: {0}")]
    Mutation(#[from] MutationError),

    /// Push subscription registration failed.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

/// Errors raised while walking the link graph or fetching a resource.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The request never produced a response (connection refused, reset, ...).
    #[error("{method} {target} failed")]
    Transport {
        /// Request method.
        method: Method,
        /// Request path including query string.
        target: String,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },

    /// The server answered with a non-2xx status.
    #[error("{method} {target} returned status {status}")]
    Status {
        /// Request method.
        method: Method,
        /// Request path including query string.
        target: String,
        /// HTTP status code.
        status: u16,
    },

    /// A relation was dereferenced that the current resource does not link.
    #[error("relation `{rel}` is not linked from {from}")]
    BrokenLink {
        /// The missing relation name.
        rel: String,
        /// Self link of the resource the relation was looked up on.
        from: String,
    },

    /// A profile document could not be read as a schema.
    #[error("malformed schema from {target}")]
    Malformed {
        /// Where the document came from.
        target: String,
        /// What was wrong with it.
        #[source]
        source: SchemaError,
    },
}

impl ResolveError {
    /// The HTTP status, when the failure was a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ResolveError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Who refused a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialOrigin {
    /// Rejected before any request: the acting manager does not own the item.
    Local {
        /// The authenticated manager.
        acting: String,
        /// The manager recorded on the item, if any.
        owner: Option<String>,
    },
    /// The server answered 403.
    Server,
}

/// Errors returned by the mutation coordinator.
///
/// None of these change application state; the view maps them to a notice.
#[derive(Error, Debug)]
pub enum MutationError {
    /// The server's version no longer matches the supplied concurrency token.
    #[error("{href} was changed by someone else; refresh and try again")]
    StaleCopy {
        /// The item that was being updated.
        href: String,
    },

    /// The acting manager may not modify this item.
    #[error("not authorized to modify {href}")]
    Forbidden {
        /// The item that was being modified.
        href: String,
        /// Whether the refusal was local or came from the server.
        origin: DenialOrigin,
    },

    /// The item carries no concurrency token (it came from a collection listing).
    #[error("{href} has no concurrency token; fetch it individually first")]
    MissingToken {
        /// The item that was being updated.
        href: String,
    },

    /// Any other transport, status or link failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors raised while registering push subscriptions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The subscriber already registered; there is no second registration.
    #[error("subscriber is already registered")]
    AlreadyRegistered,

    /// The same destination was requested twice in one registration.
    #[error("destination registered twice: {0}")]
    DuplicateDestination(String),

    /// The bus refused the registration.
    #[error("message bus unavailable: {0}")]
    Unavailable(String),
}
