//! Index key model
//!
//! An index key is the ordered list of `(field, direction)` pairs found in the
//! `key` document of a MongoDB index, e.g. `{ "a": 1, "b": -1 }`.

use crate::error::{AbbotError, AbbotResult};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Traversal direction of an index field or sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Parse a numeric direction (`1`, `-1`, or any positive/negative number).
    pub fn from_value(value: &Value) -> Option<Self> {
        let n = value.as_f64()?;
        if n > 0.0 {
            Some(Direction::Ascending)
        } else if n < 0.0 {
            Some(Direction::Descending)
        } else {
            None
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

/// One field of a compound index key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyField {
    pub name: String,
    pub direction: Direction,
}

/// Ordered compound index key. Field names are unique within a key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexKey {
    fields: Vec<KeyField>,
}

impl IndexKey {
    /// Build a key from `(field, direction)` pairs.
    pub fn new<I, S>(fields: I) -> AbbotResult<Self>
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        let mut key = IndexKey::default();
        for (name, direction) in fields {
            key.push(name.into(), direction)?;
        }
        Ok(key)
    }

    /// Parse the `key` document of an index definition.
    pub fn from_document(doc: &Value) -> AbbotResult<Self> {
        let map = doc.as_object().ok_or_else(|| {
            AbbotError::InvalidIndexKey(format!("expected a document, got {}", doc))
        })?;
        if map.is_empty() {
            return Err(AbbotError::InvalidIndexKey("index key is empty".into()));
        }

        let mut key = IndexKey::default();
        for (field, value) in map {
            if let Some(kind) = value.as_str() {
                return Err(AbbotError::UnsupportedIndexType {
                    field: field.clone(),
                    kind: kind.to_string(),
                });
            }
            let direction = Direction::from_value(value).ok_or_else(|| {
                AbbotError::InvalidIndexKey(format!(
                    "field '{}' has invalid direction {}",
                    field, value
                ))
            })?;
            key.push(field.clone(), direction)?;
        }
        Ok(key)
    }

    fn push(&mut self, name: String, direction: Direction) -> AbbotResult<()> {
        if name.is_empty() {
            return Err(AbbotError::InvalidIndexKey("empty field name".into()));
        }
        if self.contains(&name) {
            return Err(AbbotError::InvalidIndexKey(format!(
                "duplicate field '{}'",
                name
            )));
        }
        self.fields.push(KeyField { name, direction });
        Ok(())
    }

    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }

    pub fn direction_of(&self, field: &str) -> Option<Direction> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.direction)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compact JSON rendering, e.g. `{"a":1,"b":-1}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for IndexKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.direction)?;
        }
        map.end()
    }
}

/// Raw index definition as returned by `getIndexes()`; extra members are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub key: Value,
}

/// A named index on the collection under analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub name: String,
    pub key: IndexKey,
}

impl IndexSpec {
    pub fn new(name: impl Into<String>, key: IndexKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }
}

impl TryFrom<&IndexDefinition> for IndexSpec {
    type Error = AbbotError;

    fn try_from(def: &IndexDefinition) -> AbbotResult<Self> {
        Ok(IndexSpec::new(def.name.clone(), IndexKey::from_document(&def.key)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_key_in_document_order() {
        let key = IndexKey::from_document(&json!({ "b": 1, "a": -1, "c": 1.0 })).unwrap();
        let names: Vec<_> = key.field_names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(key.direction_of("a"), Some(Direction::Descending));
        assert_eq!(key.to_json(), r#"{"b":1,"a":-1,"c":1}"#);
    }

    #[test]
    fn rejects_special_index_types() {
        let err = IndexKey::from_document(&json!({ "body": "text" })).unwrap_err();
        assert_eq!(err.kind(), "unsupported_index_type");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(IndexKey::from_document(&json!([1, 2])).is_err());
        assert!(IndexKey::from_document(&json!({})).is_err());
        assert!(IndexKey::from_document(&json!({ "a": 0 })).is_err());
        assert!(IndexKey::new([("a", Direction::Ascending), ("a", Direction::Descending)]).is_err());
    }

    #[test]
    fn index_definition_ignores_extra_members() {
        let def: IndexDefinition =
            serde_json::from_value(json!({ "v": 2, "key": { "x": 1 }, "name": "x_1" })).unwrap();
        let spec = IndexSpec::try_from(&def).unwrap();
        assert_eq!(spec.name, "x_1");
        assert_eq!(spec.key.len(), 1);
    }
}
