//! Concurrent per-item detail fetches.
//!
//! Collection entries lack the concurrency token, so every member is fetched
//! again through its self link. All fetches run at once; the first failure
//! fails the whole batch and results keep the members' order.

use crate::resolver;
use futures::future::try_join_all;
use roster_core::{ResolveError, Resource, Transport};
use tracing::debug;

/// Fetches the full representation of every member, in member order.
pub async fn fetch_details<T: Transport>(
    transport: &T,
    members: &[Resource],
) -> Result<Vec<Resource>, ResolveError> {
    let hrefs = members
        .iter()
        .map(|member| {
            member.self_href().ok_or_else(|| ResolveError::BrokenLink {
                rel: "self".to_owned(),
                from: "<collection entry>".to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = hrefs.len(), "fetching item details");
    try_join_all(hrefs.into_iter().map(|href| resolver::get(transport, href))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use roster_core::{Method, Response};
    use serde_json::json;
    use std::time::Duration;

    fn member(href: &str) -> Resource {
        Resource::from_entity(json!({ "_links": { "self": { "href": href } } }))
    }

    #[tokio::test]
    async fn test_order_survives_out_of_order_completion() {
        let transport = MockTransport::new();
        for (href, name) in [("/2", "B"), ("/1", "A"), ("/3", "C")] {
            transport.get_json(href, json!({ "name": name, "_links": { "self": { "href": href } } }));
        }
        transport.delay("/1", Duration::from_millis(30));

        let members = [member("/2"), member("/1"), member("/3")];
        let items = fetch_details(&transport, &members).await.unwrap();

        let names: Vec<_> = items
            .iter()
            .map(|item| item.field("name").and_then(|v| v.as_str()).unwrap())
            .collect();
        assert_eq!(names, ["B", "A", "C"]);
        // "/1" was the last to be answered.
        let answered = transport.answered();
        assert_eq!(answered.last().map(String::as_str), Some("/1"));
    }

    #[tokio::test]
    async fn test_single_failure_fails_batch() {
        let transport = MockTransport::new();
        transport.get_json("/1", json!({ "_links": { "self": { "href": "/1" } } }));
        transport.respond(Method::Get, "/2", Response::new(404, json!(null)));

        let err = fetch_details(&transport, &[member("/1"), member("/2")])
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_member_without_self_link() {
        let transport = MockTransport::new();
        let err = fetch_details(&transport, &[Resource::from_entity(json!({}))])
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::BrokenLink { ref rel, .. } if rel == "self"));
        assert_eq!(transport.request_count(), 0);
    }
}
