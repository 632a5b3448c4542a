//! Mutation coordinator.
//!
//! Issues create, update and delete requests and classifies their failures.
//! No outcome touches application state directly: in push mode the server's
//! broadcast drives the refresh, in direct mode the returned [`Followup`] says
//! what to reload.

use crate::{config::RefreshMode, resolver};
use roster_core::{
    DenialOrigin, Method, MutationError, NavigationChain, RelationStep, Request, ResolveError,
    Resource, Response, Transport, header,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// What the caller should do once a mutation succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    /// Nothing; a push notification will trigger the refresh.
    AwaitPush,
    /// Load the page behind this link.
    Navigate(String),
    /// Reload the current page.
    ReloadCurrent,
}

/// Issues mutations against one collection relation.
pub struct MutationCoordinator<T> {
    transport: Arc<T>,
    root: String,
    relation: String,
    manager: Option<String>,
    mode: RefreshMode,
}

impl<T: Transport> MutationCoordinator<T> {
    /// A coordinator in push mode, without a manager identity.
    pub fn new(transport: Arc<T>, root: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            transport,
            root: root.into(),
            relation: relation.into(),
            manager: None,
            mode: RefreshMode::Push,
        }
    }

    /// Tracks the authenticated manager for client-side ownership checks.
    pub fn with_manager(mut self, manager: Option<String>) -> Self {
        self.manager = manager;
        self
    }

    /// Sets how callers learn that a mutation took effect.
    pub fn with_mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    /// POSTs `fields` to the collection's self link.
    ///
    /// `page_size` is only used in direct mode, to find the last page.
    pub async fn create(
        &self,
        fields: Map<String, Value>,
        page_size: u32,
    ) -> Result<Followup, MutationError> {
        let collection = self.collection(None).await?;
        let target = self_link(&collection)?.to_owned();

        let response = self.send(Request::post(&target, Value::Object(fields))).await?;
        check(Method::Post, &target, &response)?;
        info!(%target, "item created");

        match self.mode {
            RefreshMode::Push => Ok(Followup::AwaitPush),
            RefreshMode::Direct => {
                let collection = self.collection(Some(page_size)).await?;
                let href = collection
                    .links()
                    .href("last")
                    .or_else(|| collection.self_href())
                    .unwrap_or(target.as_str());
                Ok(Followup::Navigate(href.to_owned()))
            }
        }
    }

    /// PUTs `fields` over `item`, guarded by the item's concurrency token.
    ///
    /// `item` must come from an individual fetch; collection entries carry no
    /// token. The item's `manager` is carried over unless `fields` sets one.
    pub async fn update(
        &self,
        item: &Resource,
        mut fields: Map<String, Value>,
    ) -> Result<Followup, MutationError> {
        let href = self_link(item)?.to_owned();

        if let Some(acting) = &self.manager {
            let owner = manager_name(item);
            if owner != Some(acting.as_str()) {
                debug!(%href, %acting, ?owner, "update refused locally");
                return Err(MutationError::Forbidden {
                    href,
                    origin: DenialOrigin::Local {
                        acting: acting.clone(),
                        owner: owner.map(str::to_owned),
                    },
                });
            }
        }

        let token = item
            .token()
            .ok_or_else(|| MutationError::MissingToken { href: href.clone() })?;
        if let Some(manager) = item.field("manager") {
            fields
                .entry("manager")
                .or_insert_with(|| manager.clone());
        }

        let request = Request::put(&href, Value::Object(fields))
            .with_header(header::IF_MATCH, token.as_str());
        let response = self.send(request).await?;
        check(Method::Put, &href, &response)?;
        info!(%href, "item updated");
        Ok(self.reload_followup())
    }

    /// DELETEs `item`.
    pub async fn delete(&self, item: &Resource) -> Result<Followup, MutationError> {
        let href = self_link(item)?.to_owned();
        let response = self.send(Request::delete(&href)).await?;
        check(Method::Delete, &href, &response)?;
        info!(%href, "item deleted");
        Ok(self.reload_followup())
    }

    fn reload_followup(&self) -> Followup {
        match self.mode {
            RefreshMode::Push => Followup::AwaitPush,
            RefreshMode::Direct => Followup::ReloadCurrent,
        }
    }

    async fn collection(&self, page_size: Option<u32>) -> Result<Resource, MutationError> {
        let step = match page_size {
            Some(size) => RelationStep::with_params(&*self.relation, [("size", size)]),
            None => RelationStep::named(&*self.relation),
        };
        let chain = NavigationChain::new().then(step);
        resolver::resolve(&*self.transport, &self.root, &chain)
            .await?
            .into_resource()
            .ok_or_else(|| {
                MutationError::Resolve(ResolveError::BrokenLink {
                    rel: self.relation.clone(),
                    from: self.root.clone(),
                })
            })
    }

    async fn send(&self, request: Request) -> Result<Response, MutationError> {
        let method = request.method;
        let target = request.target();
        self.transport.send(request).await.map_err(|source| {
            MutationError::Resolve(ResolveError::Transport {
                method,
                target,
                source,
            })
        })
    }
}

fn self_link(resource: &Resource) -> Result<&str, MutationError> {
    resource.self_href().ok_or_else(|| {
        MutationError::Resolve(ResolveError::BrokenLink {
            rel: "self".to_owned(),
            from: "<item>".to_owned(),
        })
    })
}

/// The `manager.name` recorded on an item.
pub fn manager_name(item: &Resource) -> Option<&str> {
    item.field("manager")?.get("name")?.as_str()
}

/// Maps a mutation response's status onto the error taxonomy.
fn check(method: Method, href: &str, response: &Response) -> Result<(), MutationError> {
    match response.status {
        200..=299 => Ok(()),
        403 => Err(MutationError::Forbidden {
            href: href.to_owned(),
            origin: DenialOrigin::Server,
        }),
        409 | 412 => Err(MutationError::StaleCopy {
            href: href.to_owned(),
        }),
        status => Err(MutationError::Resolve(ResolveError::Status {
            method,
            target: href.to_owned(),
            status,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, fixtures};
    use serde_json::json;

    fn fields(first_name: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("firstName".to_owned(), json!(first_name));
        fields
    }

    fn coordinator(transport: &Arc<MockTransport>, manager: Option<&str>) -> MutationCoordinator<MockTransport> {
        MutationCoordinator::new(transport.clone(), "/api", "employees")
            .with_manager(manager.map(str::to_owned))
    }

    fn owned_by(manager: &str) -> Resource {
        Resource::from_response(
            Response::ok(fixtures::employee(1, "Frodo", manager)).with_header("ETag", "\"0\""),
        )
    }

    #[tokio::test]
    async fn test_manager_mismatch_is_refused_locally() {
        let transport = Arc::new(MockTransport::new());
        let coordinator = coordinator(&transport, Some("bob"));

        let err = coordinator
            .update(&owned_by("alice"), fields("Frodo"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MutationError::Forbidden { origin: DenialOrigin::Local { ref acting, ref owner }, .. }
                if acting == "bob" && owner.as_deref() == Some("alice")
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_if_match_and_manager() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Put, "/api/employees/1", Response::ok(json!({})));
        let coordinator = coordinator(&transport, Some("alice"));

        let followup = coordinator
            .update(&owned_by("alice"), fields("Frodo"))
            .await
            .unwrap();

        assert_eq!(followup, Followup::AwaitPush);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header(header::IF_MATCH), Some("\"0\""));
        let body = requests[0].entity.as_ref().unwrap();
        assert_eq!(body["firstName"], json!("Frodo"));
        assert_eq!(body["manager"]["name"], json!("alice"));
    }

    #[tokio::test]
    async fn test_precondition_failure_is_stale_copy() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Put, "/api/employees/1", Response::new(412, json!(null)));

        let err = coordinator(&transport, None)
            .update(&owned_by("alice"), fields("Frodo"))
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::StaleCopy { ref href } if href == "/api/employees/1"));
    }

    #[tokio::test]
    async fn test_server_forbidden_update() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Put, "/api/employees/1", Response::new(403, json!(null)));

        let err = coordinator(&transport, None)
            .update(&owned_by("alice"), fields("Frodo"))
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::Forbidden { origin: DenialOrigin::Server, .. }));
    }

    #[tokio::test]
    async fn test_collection_entry_has_no_token() {
        let transport = Arc::new(MockTransport::new());
        let entry = Resource::from_entity(fixtures::employee(1, "Frodo", "alice"));

        let err = coordinator(&transport, Some("alice"))
            .update(&entry, fields("Frodo"))
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::MissingToken { .. }));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_forbidden_delete() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(Method::Delete, "/api/employees/1", Response::new(403, json!(null)));

        let err = coordinator(&transport, None)
            .delete(&owned_by("alice"))
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::Forbidden { origin: DenialOrigin::Server, .. }));
    }

    #[tokio::test]
    async fn test_create_posts_to_collection_self_link() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo"], 2);
        transport.respond(Method::Post, "/api/employees", Response::new(201, json!({})));

        let followup = coordinator(&transport, None)
            .create(fields("Sam"), 2)
            .await
            .unwrap();

        assert_eq!(followup, Followup::AwaitPush);
        let post = transport
            .requests()
            .into_iter()
            .find(|request| request.method == Method::Post)
            .unwrap();
        assert_eq!(post.path, "/api/employees");
        assert_eq!(post.entity, Some(json!({ "firstName": "Sam" })));
    }

    #[tokio::test]
    async fn test_direct_create_navigates_to_last_page() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo", "Bilbo", "Sam"], 2);
        transport.respond(Method::Post, "/api/employees", Response::new(201, json!({})));

        let followup = coordinator(&transport, None)
            .with_mode(RefreshMode::Direct)
            .create(fields("Pippin"), 2)
            .await
            .unwrap();

        assert_eq!(
            followup,
            Followup::Navigate("/api/employees?page=1&size=2".to_owned())
        );
    }

    #[tokio::test]
    async fn test_refused_connection_on_update() {
        let transport = Arc::new(MockTransport::new());
        transport.fail(Method::Put, "/api/employees/1", "connection refused");

        let err = coordinator(&transport, None)
            .update(&owned_by("alice"), fields("Frodo"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MutationError::Resolve(ResolveError::Transport { method: Method::Put, ref target, .. })
                if target == "/api/employees/1"
        ));
    }

    #[tokio::test]
    async fn test_refused_connection_on_delete() {
        let transport = Arc::new(MockTransport::new());
        transport.fail(Method::Delete, "/api/employees/1", "connection reset");

        let err = coordinator(&transport, None)
            .delete(&owned_by("alice"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MutationError::Resolve(ResolveError::Transport { method: Method::Delete, .. })
        ));
        assert_eq!(transport.request_count(), 1);
    }
}
