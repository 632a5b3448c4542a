//! Relation descriptors and navigation chains.

use std::collections::BTreeMap;

/// Query parameters attached to one hop.
pub type QueryParams = BTreeMap<String, String>;

/// One hop of a navigation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationStep {
    /// Follow the relation as linked.
    Named(String),
    /// Follow the relation with query parameters (page size, page number, ...).
    NamedWithParams(String, QueryParams),
}

impl RelationStep {
    /// A plain relation hop.
    pub fn named(rel: impl Into<String>) -> Self {
        RelationStep::Named(rel.into())
    }

    /// A relation hop carrying query parameters.
    pub fn with_params<K, V>(rel: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let params = params
            .into_iter()
            .map(|(key, value)| (key.into(), value.to_string()))
            .collect();
        RelationStep::NamedWithParams(rel.into(), params)
    }

    /// The relation name.
    pub fn rel(&self) -> &str {
        match self {
            RelationStep::Named(rel) | RelationStep::NamedWithParams(rel, _) => rel,
        }
    }

    /// The hop's query parameters, if any.
    pub fn params(&self) -> Option<&QueryParams> {
        match self {
            RelationStep::Named(_) => None,
            RelationStep::NamedWithParams(_, params) => Some(params),
        }
    }
}

impl From<&str> for RelationStep {
    fn from(rel: &str) -> Self {
        RelationStep::named(rel)
    }
}

/// An ordered path of relations from a root resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationChain(Vec<RelationStep>);

impl NavigationChain {
    /// An empty chain; resolving it yields the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hop.
    pub fn then(mut self, step: impl Into<RelationStep>) -> Self {
        self.0.push(step.into());
        self
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chain has no hops.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hops in order.
    pub fn iter(&self) -> std::slice::Iter<'_, RelationStep> {
        self.0.iter()
    }
}

impl From<Vec<RelationStep>> for NavigationChain {
    fn from(steps: Vec<RelationStep>) -> Self {
        Self(steps)
    }
}

impl FromIterator<RelationStep> for NavigationChain {
    fn from_iter<I: IntoIterator<Item = RelationStep>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NavigationChain {
    type Item = &'a RelationStep;
    type IntoIter = std::slice::Iter<'a, RelationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
