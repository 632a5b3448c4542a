//! JSON schema metadata served on a collection's `profile` link.

use serde_json::{Map, Value};
use thiserror::Error;

/// Why a profile document could not be read as a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The document has no `properties` object.
    #[error("schema has no `properties` object")]
    MissingProperties,
}

/// Description of one schema property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// JSON schema `type`.
    pub kind: Option<String>,
    /// JSON schema `format`.
    pub format: Option<String>,
    /// Human-readable label.
    pub title: Option<String>,
    /// The property, or something nested in it, is a `$ref` to another schema.
    pub reference: bool,
}

impl FieldDescriptor {
    fn parse(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            kind: text("type"),
            format: text("format"),
            title: text("title"),
            reference: contains_reference(value),
        }
    }

    /// Whether the field can be edited as a flat text input.
    ///
    /// Links (`format: uri`) and nested resources (`$ref`) cannot.
    pub fn is_flat(&self) -> bool {
        self.format.as_deref() != Some("uri") && !self.reference
    }
}

fn contains_reference(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_reference),
        Value::Array(items) => items.iter().any(contains_reference),
        _ => false,
    }
}

/// Field descriptors in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, FieldDescriptor)>,
}

impl Schema {
    /// Parses a schema document's `properties` object.
    pub fn from_document(document: &Value) -> Result<Self, SchemaError> {
        let properties = document
            .get("properties")
            .and_then(Value::as_object)
            .ok_or(SchemaError::MissingProperties)?;
        Ok(Self::from_properties(properties))
    }

    fn from_properties(properties: &Map<String, Value>) -> Self {
        let fields = properties
            .iter()
            .map(|(name, value)| (name.clone(), FieldDescriptor::parse(value)))
            .collect();
        Self { fields }
    }

    /// Drops every field that is not a flat, text-editable value.
    pub fn editable(self) -> Self {
        let fields = self
            .fields
            .into_iter()
            .filter(|(_, field)| field.is_flat())
            .collect();
        Self { fields }
    }

    /// Field names in document order.
    pub fn attributes(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    /// The descriptor of `name`.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, descriptor)| descriptor)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
