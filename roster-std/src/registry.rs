//! Ordered hook registry.

use roster_core::{BoxError, DynHook, Hook, HookResult, Message};
use std::sync::Arc;

/// Hooks run in registration order until one returns `Stop`.
pub struct Registry<E: Message> {
    hooks: Vec<Arc<dyn DynHook<E>>>,
}

impl<E: Message> Registry<E> {
    /// Number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<E: Message + Sync> Hook<E> for Registry<E> {
    async fn on_event(&self, event: &E) -> Result<HookResult, BoxError> {
        for hook in &self.hooks {
            if hook.on_event_dyn(event).await? == HookResult::Stop {
                return Ok(HookResult::Stop);
            }
        }
        Ok(HookResult::Next)
    }
}

/// Builder for [`Registry`].
pub struct RegistryBuilder<E: Message> {
    hooks: Vec<Arc<dyn DynHook<E>>>,
}

impl<E: Message> Default for RegistryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Message> RegistryBuilder<E> {
    /// An empty builder.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Appends a hook; it runs after those already registered.
    pub fn register<H: DynHook<E>>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Finishes the registry.
    pub fn build(self) -> Registry<E> {
        Registry { hooks: self.hooks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHook;
    use roster_core::{Notification, Topic};

    #[tokio::test]
    async fn test_stop_short_circuits() {
        let first = RecordingHook::with_result(HookResult::Stop);
        let second = RecordingHook::new();
        let registry = RegistryBuilder::<Notification>::new()
            .register(first.clone())
            .register(second.clone())
            .build();

        let outcome = registry
            .on_event(&Notification::new(Topic::ItemUpdated, ""))
            .await
            .unwrap();

        assert_eq!(outcome, HookResult::Stop);
        assert_eq!(first.count(), 1);
        assert_eq!(second.count(), 0);
        assert_eq!(registry.len(), 2);
    }
}
