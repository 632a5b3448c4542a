//! Push-refresh policy.
//!
//! Each notification topic maps to one of two reactions:
//!
//! - item-created: reload at the current page size and jump to the last
//!   page, where the new item lands.
//! - item-updated, item-deleted: reload the page the viewer is on, so an
//!   edited row changes in place and a deleted row is backfilled.

use crate::{loader::CollectionLoader, resolver::Resolved, session::Session};
use roster_core::{BoxError, Hook, HookResult, Notification, PageView, ResolveError, Topic, Transport};
use std::sync::Arc;
use tracing::{debug, info};

/// How the view is reloaded after a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStrategy {
    /// Reload and navigate to the last page.
    GoToLastPage,
    /// Reload the current page number.
    CurrentPage,
}

impl RefreshStrategy {
    /// The reaction to `topic`.
    pub const fn for_topic(topic: Topic) -> Self {
        match topic {
            Topic::ItemCreated => RefreshStrategy::GoToLastPage,
            Topic::ItemUpdated | Topic::ItemDeleted => RefreshStrategy::CurrentPage,
        }
    }
}

/// Re-resolves the collection at `page_size`, then loads its `last` page, or
/// its `self` link when there is no `last`.
pub async fn refresh_and_go_to_last<T: Transport>(
    loader: &CollectionLoader<T>,
    page_size: u32,
) -> Result<PageView, ResolveError> {
    let collection = match loader.collection(page_size, None).await? {
        Resolved::Resource(collection) => collection,
        Resolved::Embedded(_) | Resolved::Empty => {
            return Ok(PageView {
                attributes: loader.cached_attributes(),
                page_size,
                ..PageView::default()
            });
        }
    };
    let target = collection
        .links()
        .href("last")
        .or_else(|| collection.self_href())
        .ok_or_else(|| ResolveError::BrokenLink {
            rel: "self".to_owned(),
            from: loader.relation().to_owned(),
        })?;
    debug!(%target, "navigating to last page");
    loader.load_link(target, page_size).await
}

/// Reloads page `page_number` at `page_size`.
pub async fn refresh_current_page<T: Transport>(
    loader: &CollectionLoader<T>,
    page_size: u32,
    page_number: u32,
) -> Result<PageView, ResolveError> {
    loader.load_page(page_size, Some(page_number)).await
}

/// Applies the refresh policy to a session for every notification.
pub struct PushRefreshHook<T> {
    session: Arc<Session<T>>,
}

impl<T> PushRefreshHook<T> {
    /// A hook refreshing `session`.
    pub fn new(session: Arc<Session<T>>) -> Self {
        Self { session }
    }
}

impl<T: Transport> Hook<Notification> for PushRefreshHook<T> {
    async fn on_event(&self, event: &Notification) -> Result<HookResult, BoxError> {
        let strategy = RefreshStrategy::for_topic(event.topic);
        info!(topic = %event.topic, ?strategy, "refreshing after notification");
        match strategy {
            RefreshStrategy::GoToLastPage => self.session.refresh_and_go_to_last().await?,
            RefreshStrategy::CurrentPage => self.session.refresh_current_page().await?,
        }
        Ok(HookResult::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, fixtures};
    use serde_json::json;

    #[test]
    fn test_topic_strategies() {
        assert_eq!(RefreshStrategy::for_topic(Topic::ItemCreated), RefreshStrategy::GoToLastPage);
        assert_eq!(RefreshStrategy::for_topic(Topic::ItemUpdated), RefreshStrategy::CurrentPage);
        assert_eq!(RefreshStrategy::for_topic(Topic::ItemDeleted), RefreshStrategy::CurrentPage);
    }

    #[tokio::test]
    async fn test_go_to_last_follows_last_link() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo", "Bilbo", "Sam"], 2);
        let loader = CollectionLoader::new(transport.clone(), "/api", "employees");

        let view = refresh_and_go_to_last(&loader, 2).await.unwrap();

        assert_eq!(view.page.map(|p| p.number), Some(1));
        assert_eq!(view.items.iter().map(fixtures::first_name).collect::<Vec<_>>(), ["Sam"]);
        let targets: Vec<_> = transport.requests().iter().map(|r| r.target()).collect();
        assert!(targets.contains(&"/api/employees?page=1&size=2".to_owned()));
    }

    #[tokio::test]
    async fn test_go_to_last_falls_back_to_self() {
        let transport = Arc::new(MockTransport::new());
        transport.get_json("/api", fixtures::api_root());
        transport.get_json("/api/profile/employees", fixtures::employee_schema());
        transport.get_json(
            "/api/employees?size=2",
            json!({
                "_embedded": { "employees": [] },
                "_links": {
                    "self": { "href": "/api/employees/all" },
                    "profile": { "href": "/api/profile/employees" }
                }
            }),
        );
        transport.get_json(
            "/api/employees/all",
            json!({
                "_embedded": { "employees": [fixtures::employee(7, "Rosie", "greg")] },
                "_links": {
                    "self": { "href": "/api/employees/all" },
                    "profile": { "href": "/api/profile/employees" }
                }
            }),
        );
        fixtures::serve_employee(&transport, 7, "Rosie", "greg");
        let loader = CollectionLoader::new(transport.clone(), "/api", "employees");

        let view = refresh_and_go_to_last(&loader, 2).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(fixtures::first_name(&view.items[0]), "Rosie");
    }

    #[tokio::test]
    async fn test_empty_collection_keeps_cached_attributes() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo", "Bilbo", "Sam"], 2);
        let loader = CollectionLoader::new(transport.clone(), "/api", "employees");
        loader.load_page(2, None).await.unwrap();

        // The root stops linking the collection.
        transport.get_json("/api", json!({}));
        let view = refresh_and_go_to_last(&loader, 2).await.unwrap();

        assert!(view.items.is_empty());
        assert_eq!(view.attributes, ["firstName", "lastName", "description"]);
        assert_eq!(view.page_size, 2);
    }
}
