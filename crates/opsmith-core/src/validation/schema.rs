//! Schema model for module argument and result definitions
//!
//! Definitions are plain, JSON-serializable data: module manifests
//! declare them as static JSON structures, and the engine accepts them
//! as deserialized values rather than language-level schema objects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered mapping from field name to its schema node
///
/// Iteration order is insertion order and is observable: fields are
/// validated in declaration order and findings are reported in that
/// order.
pub type Definition = IndexMap<String, Schema>;

/// The declared type of a field: a primitive name resolved against the
/// capability registry, or a nested definition for object fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// Primitive type name (`string`, `number`, `boolean`, ...)
    Primitive(String),
    /// Nested object definition, validated recursively
    Object(Definition),
}

impl SchemaType {
    /// Primitive type name, if this is a primitive type
    pub fn as_primitive(&self) -> Option<&str> {
        match self {
            SchemaType::Primitive(name) => Some(name),
            SchemaType::Object(_) => None,
        }
    }
}

/// One element of a `match` clause: a single guard or an AND-group of
/// guards (the value must satisfy at least one element, i.e. an OR of
/// ANDs)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchGroup {
    /// A single guard name
    One(String),
    /// An AND-group of guard names
    All(Vec<String>),
}

impl MatchGroup {
    /// The guards of this group as a slice
    pub fn guards(&self) -> &[String] {
        match self {
            MatchGroup::One(guard) => std::slice::from_ref(guard),
            MatchGroup::All(guards) => guards,
        }
    }
}

/// Declarative description of one field: type, constraints, default
/// and relations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Human-readable description (checked in strict mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Field type; untyped fields skip coercion and type-guard checks
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaType>,

    /// Additional type constraints, as an OR of AND-groups of guards
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MatchGroup>,

    /// Whether the field must be present (input mode only)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Whether the field may legitimately be absent (output mode only)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    /// Default value, rendered lazily through the templating
    /// collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Enumeration of allowed values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,

    /// Example values, validated recursively in strict mode
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,

    /// Alternate input keys collapsed to the canonical field name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Deprecation notice; presence makes any use of the field warn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,

    /// Fields that cannot be used together with this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,

    /// Fields that must be present whenever this one is
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

impl Schema {
    /// Nested definition, if this field is object-typed
    pub fn nested(&self) -> Option<&Definition> {
        match &self.kind {
            Some(SchemaType::Object(definition)) => Some(definition),
            _ => None,
        }
    }

    /// Primitive type name, if declared
    pub fn primitive(&self) -> Option<&str> {
        self.kind.as_ref().and_then(SchemaType::as_primitive)
    }
}

/// Parse a definition from a JSON value, as found in module manifests
pub fn definition_from_value(value: Value) -> crate::Result<Definition> {
    Ok(serde_json::from_value(value)?)
}
