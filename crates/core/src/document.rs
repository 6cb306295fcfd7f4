//! Document and identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a document within a collection.
///
/// Remote endpoints use either strings or integers; both render to the same
/// textual form when used in URL paths and store keys. `UInt` only holds
/// values above `i64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Int(i64),
    UInt(u64),
    Str(String),
}

impl DocId {
    /// An empty string id is treated as absent.
    pub fn is_missing(&self) -> bool {
        matches!(self, DocId::Str(s) if s.is_empty())
    }

    /// Whether the id can name a resource under its collection URL.
    /// `.` and `..` would resolve to the collection or its parent.
    pub fn is_addressable(&self) -> bool {
        match self {
            DocId::Str(s) => !matches!(s.as_str(), "" | "." | ".."),
            DocId::Int(_) | DocId::UInt(_) => true,
        }
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Int(n) => write!(f, "{n}"),
            DocId::UInt(n) => write!(f, "{n}"),
            DocId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocId {
    fn from(n: i64) -> Self {
        DocId::Int(n)
    }
}

impl From<u64> for DocId {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(DocId::UInt(n), DocId::Int)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        DocId::Str(s.to_string())
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        DocId::Str(s)
    }
}

impl From<&DocId> for DocId {
    fn from(id: &DocId) -> Self {
        id.clone()
    }
}

/// A resource document: a JSON object identified by its `id` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document's `id` field, if it holds a string or an integer.
    pub fn id(&self) -> Option<DocId> {
        match self.0.get("id")? {
            Value::String(s) => Some(DocId::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(DocId::Int).or_else(|| n.as_u64().map(DocId::UInt)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::Error::InvalidInput(format!("expected a JSON object, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::try_from(value).unwrap()
    }

    #[test]
    fn test_id_variants() {
        assert_eq!(doc(json!({"id": 1})).id(), Some(DocId::Int(1)));
        assert_eq!(doc(json!({"id": "abc"})).id(), Some(DocId::Str("abc".into())));
        assert_eq!(doc(json!({"id": null})).id(), None);
        assert_eq!(doc(json!({"name": "x"})).id(), None);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(DocId::Int(42).to_string(), "42");
        assert_eq!(DocId::from("u-1").to_string(), "u-1");
        assert_eq!(DocId::UInt(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn test_large_unsigned_id() {
        assert_eq!(doc(json!({"id": u64::MAX})).id(), Some(DocId::UInt(u64::MAX)));
        assert_eq!(DocId::from(7u64), DocId::Int(7));
        assert_eq!(DocId::from(u64::MAX), DocId::UInt(u64::MAX));

        let id: DocId = serde_json::from_value(json!(u64::MAX)).unwrap();
        assert_eq!(id, DocId::UInt(u64::MAX));
    }

    #[test]
    fn test_fractional_id_is_not_an_id() {
        assert_eq!(doc(json!({"id": 1.5})).id(), None);
    }

    #[test]
    fn test_addressable() {
        assert!(DocId::from("a/b").is_addressable());
        assert!(DocId::Int(0).is_addressable());
        assert!(!DocId::from("").is_addressable());
        assert!(!DocId::from(".").is_addressable());
        assert!(!DocId::from("..").is_addressable());
    }

    #[test]
    fn test_missing_id() {
        assert!(DocId::from("").is_missing());
        assert!(!DocId::Int(0).is_missing());
        assert!(!DocId::from("0").is_missing());
    }

    #[test]
    fn test_try_from_non_object() {
        assert!(Document::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let d = doc(json!({"id": 1, "str": "a"}));
        assert_eq!(serde_json::to_value(&d).unwrap(), json!({"id": 1, "str": "a"}));
    }
}
