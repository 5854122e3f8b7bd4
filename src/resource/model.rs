//! Normalized resource representation shared by every collector

use super::normalize::{format_timestamp, normalize_attributes};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Identifier used when a provider record carries no natural one.
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

/// Ordered attribute mapping; insertion order is preserved on the wire.
pub type Attributes = IndexMap<String, AttrValue>;

/// Kind of infrastructure object a [`Resource`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    ComputeInstance,
    StorageBucket,
    DatabaseInstance,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ComputeInstance => "compute-instance",
            ResourceKind::StorageBucket => "storage-bucket",
            ResourceKind::DatabaseInstance => "database-instance",
        }
    }
}

/// Generic attribute tree.
///
/// `Timestamp` only exists between collection and normalization; a
/// [`Resource`] never holds one.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<AttrValue>),
    Object(Attributes),
}

impl AttrValue {
    /// True if a temporal value is reachable anywhere below this node.
    pub fn contains_timestamp(&self) -> bool {
        match self {
            AttrValue::Timestamp(_) => true,
            AttrValue::Array(items) => items.iter().any(AttrValue::contains_timestamp),
            AttrValue::Object(map) => map.values().any(AttrValue::contains_timestamp),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Null => serializer.serialize_unit(),
            AttrValue::Bool(b) => serializer.serialize_bool(*b),
            AttrValue::Number(n) => n.serialize(serializer),
            AttrValue::String(s) => serializer.serialize_str(s),
            AttrValue::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
            AttrValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AttrValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value.into())
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttrValue::Timestamp(value)
    }
}

impl From<Attributes> for AttrValue {
    fn from(value: Attributes) -> Self {
        AttrValue::Object(value)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(value: Vec<T>) -> Self {
        AttrValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

/// One normalized infrastructure object.
///
/// Construction normalizes the attribute tree, so every `Resource` in
/// circulation is already free of temporal values.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Resource {
    kind: ResourceKind,
    identifier: String,
    #[serde(rename = "data")]
    attributes: Attributes,
}

impl Resource {
    pub fn new(kind: ResourceKind, identifier: Option<&str>, attributes: Attributes) -> Self {
        let identifier = match identifier {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => UNKNOWN_IDENTIFIER.to_string(),
        };
        Self {
            kind,
            identifier,
            attributes: normalize_attributes(attributes),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}
