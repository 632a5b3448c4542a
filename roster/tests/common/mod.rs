#![allow(dead_code)]

use roster::{
    AppState, RefreshMode, SessionConfig,
    testing::{MockTransport, fixtures},
};
use std::sync::Arc;

pub const NAMES: &[&str] = &["Frodo", "Bilbo", "Sam"];

/// A transport serving [`NAMES`] in pages of two.
pub fn roster_transport() -> Arc<MockTransport> {
    roster_of(NAMES)
}

pub fn roster_of(names: &[&str]) -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    fixtures::serve_roster(&transport, names, 2);
    transport
}

pub fn config(manager: Option<&str>, refresh: RefreshMode) -> SessionConfig {
    SessionConfig {
        manager: manager.map(str::to_owned),
        refresh,
        ..SessionConfig::default()
    }
}

pub fn names(state: &AppState) -> Vec<String> {
    state
        .items
        .iter()
        .map(|item| fixtures::first_name(item).to_owned())
        .collect()
}

/// Targets of every GET sent since the log was last cleared.
pub fn fetched(transport: &MockTransport) -> Vec<String> {
    transport
        .requests()
        .iter()
        .filter(|request| request.method == roster::Method::Get)
        .map(|request| request.target())
        .collect()
}
