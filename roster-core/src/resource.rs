//! Fetched HAL representations.
//!
//! A [`Resource`] is built once from a response and never modified; refreshing
//! means fetching a new one.

use crate::transport::{Response, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One outbound link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target, possibly a URI template.
    pub href: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    /// Whether `href` is a URI template.
    pub templated: bool,
}

impl Link {
    /// A plain, non-templated link.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
        }
    }

    /// The href with any URI-template expression removed.
    ///
    /// `/api/employees{?page,size,sort}` becomes `/api/employees`; the
    /// parameters are attached by the caller as query parameters instead.
    pub fn target(&self) -> &str {
        if !self.templated {
            return &self.href;
        }
        match self.href.find('{') {
            Some(start) => &self.href[..start],
            None => &self.href,
        }
    }
}

/// HAL allows a relation to carry a single link or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    One(Link),
    Many(Vec<Link>),
}

/// Named outbound links of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    /// Parses a `_links` object, keeping the first link of array-valued relations.
    fn parse(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let links = map
            .iter()
            .filter_map(|(rel, entry)| {
                let link = match serde_json::from_value::<LinkEntry>(entry.clone()).ok()? {
                    LinkEntry::One(link) => link,
                    LinkEntry::Many(links) => links.into_iter().next()?,
                };
                Some((rel.clone(), link))
            })
            .collect();
        Self(links)
    }

    /// The link named `rel`.
    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.get(rel)
    }

    /// Dereferenceable target of `rel`, template suffix stripped.
    pub fn href(&self, rel: &str) -> Option<&str> {
        self.get(rel).map(Link::target)
    }

    /// Whether `rel` is linked.
    pub fn contains(&self, rel: &str) -> bool {
        self.0.contains_key(rel)
    }

    /// Whether there are no links at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Relation names, sorted.
    pub fn rels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Relations and their links, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.0.iter().map(|(rel, link)| (rel.as_str(), link))
    }
}

impl FromIterator<(String, Link)> for Links {
    fn from_iter<I: IntoIterator<Item = (String, Link)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Opaque entity tag used as the `If-Match` precondition on update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcurrencyToken(String);

impl ConcurrencyToken {
    /// Wraps an entity tag as received.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag, quotes included.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pagination metadata of a collection page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Requested page size.
    pub size: u32,
    /// Items in the whole collection.
    pub total_elements: u64,
    /// Pages at this page size.
    pub total_pages: u32,
    /// 0-based.
    pub number: u32,
}

/// An immutable fetched representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    entity: Value,
    links: Links,
    token: Option<ConcurrencyToken>,
}

impl Resource {
    /// A resource built from a body alone (embedded children, collection entries).
    pub fn from_entity(entity: Value) -> Self {
        let links = Links::parse(entity.get("_links"));
        Self {
            entity,
            links,
            token: None,
        }
    }

    /// A resource built from a full response, keeping its entity tag.
    pub fn from_response(response: Response) -> Self {
        let token = response.header(header::ETAG).map(ConcurrencyToken::new);
        Self {
            token,
            ..Self::from_entity(response.entity)
        }
    }

    /// The full body.
    pub fn entity(&self) -> &Value {
        &self.entity
    }

    /// The parsed `_links`.
    pub fn links(&self) -> &Links {
        &self.links
    }

    /// The `self` link target.
    pub fn self_href(&self) -> Option<&str> {
        self.links.href("self")
    }

    /// The concurrency token; only present on individually fetched items.
    pub fn token(&self) -> Option<&ConcurrencyToken> {
        self.token.as_ref()
    }

    /// A top-level body field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.entity.get(name)
    }

    /// Whether `_embedded` carries `rel`.
    pub fn has_embedded(&self, rel: &str) -> bool {
        self.entity
            .get("_embedded")
            .and_then(Value::as_object)
            .is_some_and(|embedded| embedded.contains_key(rel))
    }

    /// Inline children under `_embedded[rel]`, in document order.
    ///
    /// A single embedded object is returned as a one-element list.
    pub fn embedded(&self, rel: &str) -> Option<Vec<Resource>> {
        let value = self.entity.get("_embedded")?.get(rel)?;
        let children = match value {
            Value::Array(children) => children.iter().cloned().map(Self::from_entity).collect(),
            Value::Null => Vec::new(),
            other => vec![Self::from_entity(other.clone())],
        };
        Some(children)
    }

    /// The `page` block of a paged collection.
    pub fn page(&self) -> Option<PageMeta> {
        serde_json::from_value(self.entity.get("page")?.clone()).ok()
    }
}
