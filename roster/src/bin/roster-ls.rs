//! Lists one page of the roster.
//!
//! Reads the session settings from `ROSTER_*` variables, the server from
//! `ROSTER_BASE_URL` (default `http://localhost:8080/`) and optional basic
//! credentials from `ROSTER_USER` / `ROSTER_PASSWORD`.

use roster::{BoxError, HttpTransport, Session, SessionConfig};
use serde_json::Value;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,roster_std=info".into()),
        )
        .init();

    let config = SessionConfig::from_env()?;
    let base = std::env::var("ROSTER_BASE_URL").unwrap_or_else(|_| "http://localhost:8080/".into());
    let mut transport = HttpTransport::new(&base)?;
    if let (Ok(user), Ok(password)) = (std::env::var("ROSTER_USER"), std::env::var("ROSTER_PASSWORD")) {
        transport = transport.with_basic_auth(user, password);
    }

    let session = Session::new(Arc::new(transport), &config);
    session.mount().await?;
    let state = session.snapshot();

    println!("{}", state.attributes.join("\t"));
    for item in &state.items {
        let row: Vec<String> = state
            .attributes
            .iter()
            .map(|attribute| match item.field(attribute) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        println!("{}", row.join("\t"));
    }
    if let Some(page) = state.page {
        println!(
            "-- page {} of {} ({} total)",
            page.number + 1,
            page.total_pages.max(1),
            page.total_elements
        );
    }
    Ok(())
}
