//! Collection loader.
//!
//! Produces a fully materialized [`PageView`]: the collection page reached
//! through the resolver, the editable attributes from the profile schema, and
//! every item fetched individually so it carries its concurrency token.

use crate::{
    fanout,
    resolver::{self, Resolved},
};
use roster_core::{
    Links, NavigationChain, PageView, Request, RelationStep, ResolveError, Resource, Schema,
    Transport, header, media,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Loads pages of one collection relation.
///
/// The filtered schema is fetched on the first load and kept for the lifetime
/// of the loader.
pub struct CollectionLoader<T> {
    transport: Arc<T>,
    root: String,
    relation: String,
    schema: OnceCell<Schema>,
}

impl<T: Transport> CollectionLoader<T> {
    /// A loader for `relation`, reached from `root`.
    pub fn new(transport: Arc<T>, root: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            transport,
            root: root.into(),
            relation: relation.into(),
            schema: OnceCell::new(),
        }
    }

    /// The collection relation.
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// The cached schema, once a load has discovered it.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.get()
    }

    /// Resolves `[relation {size, page?}]` from the API root.
    pub async fn collection(
        &self,
        page_size: u32,
        page: Option<u32>,
    ) -> Result<Resolved, ResolveError> {
        let mut params = vec![("size", page_size)];
        if let Some(page) = page {
            params.push(("page", page));
        }
        let chain = NavigationChain::new().then(RelationStep::with_params(&*self.relation, params));
        resolver::resolve(&*self.transport, &self.root, &chain).await
    }

    /// Loads one page: collection, schema, then every item.
    pub async fn load_page(
        &self,
        page_size: u32,
        page: Option<u32>,
    ) -> Result<PageView, ResolveError> {
        let collection = self.collection(page_size, page).await?;
        let attributes = match &collection {
            Resolved::Resource(resource) => self.attributes_for(resource).await?,
            Resolved::Embedded(_) | Resolved::Empty => self.cached_attributes(),
        };
        self.materialize(collection, attributes, page_size).await
    }

    /// Loads the page behind a pagination link (`first`, `prev`, `next`, ...).
    ///
    /// The chain is not walked again; the schema is reused once cached.
    pub async fn load_link(&self, href: &str, page_size: u32) -> Result<PageView, ResolveError> {
        let collection = resolver::get(&*self.transport, href).await?;
        let attributes = self.attributes_for(&collection).await?;
        self.materialize(Resolved::Resource(collection), attributes, page_size)
            .await
    }

    async fn attributes_for(&self, collection: &Resource) -> Result<Vec<String>, ResolveError> {
        let schema = self
            .schema
            .get_or_try_init(|| self.discover_schema(collection))
            .await?;
        Ok(schema.attributes())
    }

    /// Attributes of the cached schema; empty before the first discovery.
    pub(crate) fn cached_attributes(&self) -> Vec<String> {
        self.schema.get().map(Schema::attributes).unwrap_or_default()
    }

    async fn discover_schema(&self, collection: &Resource) -> Result<Schema, ResolveError> {
        let href = collection
            .links()
            .href("profile")
            .ok_or_else(|| ResolveError::BrokenLink {
                rel: "profile".to_owned(),
                from: collection.self_href().unwrap_or(self.relation.as_str()).to_owned(),
            })?;
        let request = Request::get(href).with_header(header::ACCEPT, media::SCHEMA_JSON);
        let document = resolver::fetch(&*self.transport, request).await?;
        let schema = Schema::from_document(document.entity())
            .map_err(|source| ResolveError::Malformed {
                target: href.to_owned(),
                source,
            })?
            .editable();
        debug!(attributes = ?schema.attributes(), "schema discovered");
        Ok(schema)
    }

    async fn materialize(
        &self,
        collection: Resolved,
        attributes: Vec<String>,
        page_size: u32,
    ) -> Result<PageView, ResolveError> {
        let (members, page, links) = match collection {
            Resolved::Resource(resource) => (
                resource.embedded(&self.relation).unwrap_or_default(),
                resource.page(),
                resource.links().clone(),
            ),
            Resolved::Embedded(children) => (children, None, Links::default()),
            Resolved::Empty => (Vec::new(), None, Links::default()),
        };
        let items = fanout::fetch_details(&*self.transport, &members).await?;
        Ok(PageView {
            items,
            attributes,
            page,
            links,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, fixtures};
    use roster_core::{Method, Response, SchemaError};
    use serde_json::json;

    fn loader(transport: &Arc<MockTransport>) -> CollectionLoader<MockTransport> {
        CollectionLoader::new(transport.clone(), "/api", "employees")
    }

    #[tokio::test]
    async fn test_load_page_materializes_items() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo", "Bilbo", "Sam"], 2);

        let view = loader(&transport).load_page(2, None).await.unwrap();

        let names: Vec<_> = view.items.iter().map(fixtures::first_name).collect();
        assert_eq!(names, ["Frodo", "Bilbo"]);
        assert!(view.items.iter().all(|item| item.token().is_some()));
        assert_eq!(view.attributes, ["firstName", "lastName", "description"]);
        assert_eq!(view.page.map(|p| p.total_pages), Some(2));
        assert_eq!(view.links.href("next"), Some("/api/employees?page=1&size=2"));
        assert_eq!(view.page_size, 2);
    }

    #[tokio::test]
    async fn test_schema_is_fetched_once() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo", "Bilbo", "Sam"], 2);
        let loader = loader(&transport);

        loader.load_page(2, None).await.unwrap();
        loader.load_page(2, Some(1)).await.unwrap();
        loader
            .load_link("/api/employees?page=1&size=2", 2)
            .await
            .unwrap();

        let profile_fetches = transport
            .requests()
            .iter()
            .filter(|request| request.path == "/api/profile/employees")
            .count();
        assert_eq!(profile_fetches, 1);
        let accept = transport
            .requests()
            .into_iter()
            .find(|request| request.path == "/api/profile/employees")
            .and_then(|request| request.header("accept").map(str::to_owned));
        assert_eq!(accept.as_deref(), Some(media::SCHEMA_JSON));
    }

    #[tokio::test]
    async fn test_load_link_skips_root() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo", "Bilbo", "Sam"], 2);
        let loader = loader(&transport);
        loader.load_page(2, None).await.unwrap();
        transport.clear_requests();

        let view = loader
            .load_link("/api/employees?page=1&size=2", 2)
            .await
            .unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(fixtures::first_name(&view.items[0]), "Sam");
        assert!(transport.requests().iter().all(|r| r.path != "/api"));
    }

    #[tokio::test]
    async fn test_failing_item_fails_page() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo", "Bilbo"], 2);
        transport.respond(Method::Get, "/api/employees/2", Response::new(500, json!(null)));

        let err = loader(&transport).load_page(2, None).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_empty_root_yields_empty_page() {
        let transport = Arc::new(MockTransport::new());
        transport.get_json("/api", json!({}));

        let view = loader(&transport).load_page(5, None).await.unwrap();

        assert!(view.items.is_empty());
        assert!(view.attributes.is_empty());
        assert!(view.page.is_none());
        assert_eq!(view.page_size, 5);
    }

    #[tokio::test]
    async fn test_profile_without_properties_is_malformed() {
        let transport = Arc::new(MockTransport::new());
        fixtures::serve_roster(&transport, &["Frodo"], 2);
        transport.get_json("/api/profile/employees", json!({ "title": "Employee" }));

        let err = loader(&transport).load_page(2, None).await.unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Malformed { ref target, source: SchemaError::MissingProperties }
                if target == "/api/profile/employees"
        ));
    }
}
