//! Link resolver.
//!
//! Walks a [`NavigationChain`] one hop at a time. Each hop either takes an
//! embedded child list as-is, stops at a resource without links, or issues a
//! GET on the linked target. Nothing is cached.

use roster_core::{
    NavigationChain, RelationStep, Request, ResolveError, Resource, Transport, header, media,
};
use tracing::debug;

/// The result of walking a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A fetched resource (or the root, for an empty chain).
    Resource(Resource),
    /// Children that were embedded under the requested relation.
    Embedded(Vec<Resource>),
    /// The walk reached a resource without links; nothing further exists.
    Empty,
}

impl Resolved {
    /// The fetched resource, if the walk produced one.
    pub fn into_resource(self) -> Option<Resource> {
        match self {
            Resolved::Resource(resource) => Some(resource),
            Resolved::Embedded(_) | Resolved::Empty => None,
        }
    }

    /// Whether the walk ran out of links.
    pub fn is_empty(&self) -> bool {
        matches!(self, Resolved::Empty)
    }
}

/// Sends a request and turns a successful answer into a [`Resource`].
///
/// Non-2xx answers become [`ResolveError::Status`].
pub async fn fetch<T: Transport>(transport: &T, request: Request) -> Result<Resource, ResolveError> {
    let method = request.method;
    let target = request.target();
    let response = transport
        .send(request)
        .await
        .map_err(|source| ResolveError::Transport {
            method,
            target: target.clone(),
            source,
        })?;
    debug!(%method, %target, status = response.status, "fetched");
    if !response.is_success() {
        return Err(ResolveError::Status {
            method,
            target,
            status: response.status,
        });
    }
    Ok(Resource::from_response(response))
}

/// GETs a HAL document.
pub async fn get<T: Transport>(transport: &T, href: &str) -> Result<Resource, ResolveError> {
    fetch(transport, Request::get(href).with_header(header::ACCEPT, media::HAL_JSON)).await
}

/// Fetches `root` and walks `chain` from it.
pub async fn resolve<T: Transport>(
    transport: &T,
    root: &str,
    chain: &NavigationChain,
) -> Result<Resolved, ResolveError> {
    let start = get(transport, root).await?;
    follow_from(transport, start, chain).await
}

/// Walks `chain` from an already fetched resource.
///
/// An empty chain yields `start` unchanged.
pub async fn follow_from<T: Transport>(
    transport: &T,
    start: Resource,
    chain: &NavigationChain,
) -> Result<Resolved, ResolveError> {
    let mut current = Resolved::Resource(start);
    for step in chain {
        current = match current {
            Resolved::Resource(resource) => hop(transport, &resource, step).await?,
            Resolved::Embedded(_) | Resolved::Empty => {
                debug!(rel = step.rel(), "nothing left to follow");
                Resolved::Empty
            }
        };
    }
    Ok(current)
}

async fn hop<T: Transport>(
    transport: &T,
    current: &Resource,
    step: &RelationStep,
) -> Result<Resolved, ResolveError> {
    let rel = step.rel();
    if let Some(children) = current.embedded(rel) {
        debug!(rel, count = children.len(), "relation embedded");
        return Ok(Resolved::Embedded(children));
    }
    if current.links().is_empty() {
        return Ok(Resolved::Empty);
    }
    let href = current
        .links()
        .href(rel)
        .ok_or_else(|| ResolveError::BrokenLink {
            rel: rel.to_owned(),
            from: current.self_href().unwrap_or("<root>").to_owned(),
        })?;
    let mut request = Request::get(href).with_header(header::ACCEPT, media::HAL_JSON);
    if let Some(params) = step.params() {
        request = request.with_params(params.clone());
    }
    fetch(transport, request).await.map(Resolved::Resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use roster_core::{Method, Response};
    use serde_json::json;

    fn root_entity() -> serde_json::Value {
        json!({
            "_links": {
                "employees": { "href": "/api/employees{?page,size,sort}", "templated": true },
                "profile": { "href": "/api/profile" }
            }
        })
    }

    #[tokio::test]
    async fn test_empty_chain_returns_root() {
        let transport = MockTransport::new();
        transport.get_json("/api", root_entity());

        let resolved = resolve(&transport, "/api", &NavigationChain::new())
            .await
            .unwrap();

        assert_eq!(resolved, Resolved::Resource(Resource::from_entity(root_entity())));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_embedded_relation_needs_no_request() {
        let transport = MockTransport::new();
        let start = Resource::from_entity(json!({
            "_links": { "self": { "href": "/api/managers/1" } },
            "_embedded": { "employees": [{ "firstName": "Frodo" }] }
        }));

        let chain = NavigationChain::new().then("employees");
        let resolved = follow_from(&transport, start, &chain).await.unwrap();

        match resolved {
            Resolved::Embedded(children) => {
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].field("firstName"), Some(&json!("Frodo")));
            }
            other => panic!("expected embedded children, got {other:?}"),
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_linkless_resource_resolves_empty() {
        let transport = MockTransport::new();
        let start = Resource::from_entity(json!({ "name": "orphan" }));

        let chain = NavigationChain::new().then("employees").then("manager");
        let resolved = follow_from(&transport, start, &chain).await.unwrap();

        assert!(resolved.is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_params_are_attached_to_hop() {
        let transport = MockTransport::new();
        transport.get_json("/api", root_entity());
        transport.get_json("/api/employees?page=1&size=2", json!({ "page": { "number": 1, "size": 2, "totalElements": 3, "totalPages": 2 } }));

        let chain = NavigationChain::new()
            .then(RelationStep::with_params("employees", [("size", 2), ("page", 1)]));
        let resolved = resolve(&transport, "/api", &chain).await.unwrap();

        let collection = resolved.into_resource().unwrap();
        assert_eq!(collection.page().map(|p| p.number), Some(1));
        let requests = transport.requests();
        assert_eq!(requests[1].path, "/api/employees");
        assert_eq!(requests[1].params.get("size").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn test_missing_relation_is_broken_link() {
        let transport = MockTransport::new();
        transport.get_json("/api", root_entity());

        let chain = NavigationChain::new().then("managers");
        let err = resolve(&transport, "/api", &chain).await.unwrap_err();

        assert!(matches!(err, ResolveError::BrokenLink { ref rel, .. } if rel == "managers"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_error_status_propagates() {
        let transport = MockTransport::new();
        transport.get_json("/api", root_entity());
        transport.respond(Method::Get, "/api/employees", Response::new(500, json!(null)));

        let chain = NavigationChain::new().then("employees");
        let err = resolve(&transport, "/api", &chain).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let transport = MockTransport::new();
        transport.fail(Method::Get, "/api", "connection refused");

        let err = resolve(&transport, "/api", &NavigationChain::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Transport { method: Method::Get, .. }));
    }
}
