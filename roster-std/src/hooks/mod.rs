//! Standard hooks.

mod logging;

pub use logging::LoggingHook;
