//! Session configuration.
//!
//! Every field has a default matching the payroll API layout, so an empty
//! JSON object or an empty environment yields a usable configuration.

use roster_core::Topic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the view learns that a mutation took effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Wait for the server's push notification.
    #[default]
    Push,
    /// No push channel; reload right after the mutation.
    Direct,
}

/// Destinations the server publishes each topic on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicDestinations {
    /// Item-created destination.
    pub created: String,
    /// Item-updated destination.
    pub updated: String,
    /// Item-deleted destination.
    pub deleted: String,
}

impl Default for TopicDestinations {
    fn default() -> Self {
        Self {
            created: "/topic/newEmployee".to_owned(),
            updated: "/topic/updateEmployee".to_owned(),
            deleted: "/topic/deleteEmployee".to_owned(),
        }
    }
}

impl TopicDestinations {
    /// The destination `topic` is published on.
    pub fn destination(&self, topic: Topic) -> &str {
        match topic {
            Topic::ItemCreated => &self.created,
            Topic::ItemUpdated => &self.updated,
            Topic::ItemDeleted => &self.deleted,
        }
    }

    /// `(topic, destination)` for every topic.
    pub fn pairs(&self) -> Vec<(Topic, String)> {
        Topic::ALL
            .into_iter()
            .map(|topic| (topic, self.destination(topic).to_owned()))
            .collect()
    }
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The page size is zero.
    #[error("page size must be at least 1")]
    InvalidPageSize,

    /// The relation name is blank.
    #[error("collection relation must not be empty")]
    EmptyRelation,

    /// Two topics are published on one destination.
    #[error("topics {0} and {1} share a destination")]
    SharedDestination(Topic, Topic),

    /// An environment variable holds an unusable value.
    #[error("invalid value for {var}: {value:?}")]
    Env {
        /// The variable.
        var: &'static str,
        /// Its value.
        value: String,
    },

    /// The JSON document could not be parsed.
    #[error("invalid configuration document")]
    Parse(#[from] serde_json::Error),
}

/// Settings of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// API root the navigation chain starts from.
    pub root: String,
    /// Relation naming the collection.
    pub relation: String,
    /// Initial page size.
    pub page_size: u32,
    /// Authenticated manager; enables client-side ownership checks.
    pub manager: Option<String>,
    /// How the view learns that a mutation took effect.
    pub refresh: RefreshMode,
    /// Where each topic is published.
    pub topics: TopicDestinations,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: "/api".to_owned(),
            relation: "employees".to_owned(),
            page_size: 2,
            manager: None,
            refresh: RefreshMode::Push,
            topics: TopicDestinations::default(),
        }
    }
}

impl SessionConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `ROSTER_ROOT`, `ROSTER_RELATION`, `ROSTER_PAGE_SIZE`,
    /// `ROSTER_MANAGER` and `ROSTER_REFRESH` (`push` or `direct`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(root) = lookup("ROSTER_ROOT") {
            config.root = root;
        }
        if let Some(relation) = lookup("ROSTER_RELATION") {
            config.relation = relation;
        }
        if let Some(value) = lookup("ROSTER_PAGE_SIZE") {
            config.page_size = value.trim().parse().map_err(|_| ConfigError::Env {
                var: "ROSTER_PAGE_SIZE",
                value: value.clone(),
            })?;
        }
        config.manager = lookup("ROSTER_MANAGER").filter(|name| !name.is_empty());
        if let Some(value) = lookup("ROSTER_REFRESH") {
            config.refresh = match value.as_str() {
                "push" => RefreshMode::Push,
                "direct" => RefreshMode::Direct,
                _ => {
                    return Err(ConfigError::Env {
                        var: "ROSTER_REFRESH",
                        value,
                    });
                }
            };
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks the page size, the relation and the topic destinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if self.relation.trim().is_empty() {
            return Err(ConfigError::EmptyRelation);
        }
        let pairs = self.topics.pairs();
        for (index, (topic, destination)) in pairs.iter().enumerate() {
            if let Some((other, _)) = pairs[index + 1..].iter().find(|(_, d)| d == destination) {
                return Err(ConfigError::SharedDestination(*topic, *other));
            }
        }
        Ok(())
    }
}
