//! # roster-std
//!
//! Standard implementations for the Roster hypermedia client.
//!
//! This crate provides:
//! - **Navigation**: the link [`resolver`] and the concurrent item [`fanout`]
//! - **Loading**: the [`loader::CollectionLoader`] with schema discovery
//! - **Mutations**: the [`mutation::MutationCoordinator`]
//! - **Push refresh**: the [`refresh`] policy, the [`dispatch`] loop and an
//!   in-process [`bus::LocalBus`]
//! - **State**: the [`session::Session`] the view drives
//! - **Transport**: [`http::HttpTransport`] (feature `http`)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use roster_core;

pub mod bus;
pub mod config;
pub mod dispatch;
pub mod fanout;
pub mod hooks;
#[cfg(feature = "http")]
pub mod http;
pub mod loader;
pub mod mutation;
pub mod refresh;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod testing;
