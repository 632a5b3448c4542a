//! Logging hook for notification observation.

use roster_core::{BoxError, Hook, HookResult, Notification};
use tracing::info;

/// Logs every notification and lets it through.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook;

impl Hook<Notification> for LoggingHook {
    async fn on_event(&self, event: &Notification) -> Result<HookResult, BoxError> {
        info!(topic = %event.topic, payload = %event.payload, "notification received");
        Ok(HookResult::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::Topic;

    #[tokio::test]
    async fn test_logging_hook_passes_through() {
        let outcome = LoggingHook
            .on_event(&Notification::new(Topic::ItemCreated, "{}"))
            .await
            .unwrap();
        assert_eq!(outcome, HookResult::Next);
    }
}
