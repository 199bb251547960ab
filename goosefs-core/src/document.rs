//! The document representation shared by every layer of the store.
//!
//! A [`Document`] is a flat JSON object. Documents that have been saved at least
//! once always carry a string `_id` field; documents built from raw input may not
//! have one yet.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, from_value, to_value};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Name of the identity field present on every persisted document.
pub const ID_FIELD: &str = "_id";

/// A single record: a mapping of field name to JSON value.
///
/// # Example
///
/// ```ignore
/// use goosefs_core::document::Document;
/// use serde_json::json;
///
/// let doc = Document::from_value(json!({ "fname": "John" })).unwrap();
/// assert_eq!(doc.get("fname"), Some(&json!("John")));
/// assert!(doc.id().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds a document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if `value` is not a JSON object.
    pub fn from_value(value: Value) -> DocumentStoreResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DocumentStoreError::InvalidArgument(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Serializes any serde type into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not serialize to a JSON object.
    pub fn encode<T: Serialize>(value: &T) -> DocumentStoreResult<Self> {
        Self::from_value(to_value(value)?)
    }

    /// Deserializes this document into a serde type.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if the shapes do not match.
    pub fn decode<T: DeserializeOwned>(&self) -> DocumentStoreResult<T> {
        Ok(from_value(Value::Object(self.0.clone()))?)
    }

    /// Returns the `_id` of this document, if it has a string one.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
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

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

/// Short human-readable name of a JSON value's kind, used in error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Person {
        #[serde(rename = "_id")]
        id: String,
        fname: String,
        age: i64,
    }

    #[test]
    fn rejects_non_object_values() {
        let err = Document::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, DocumentStoreError::InvalidArgument(_)));
    }

    #[test]
    fn id_is_only_read_from_strings() {
        let doc = Document::from_value(json!({ "_id": 7 })).unwrap();
        assert_eq!(doc.id(), None);

        let doc = Document::from_value(json!({ "_id": "abc" })).unwrap();
        assert_eq!(doc.id(), Some("abc"));
    }

    #[test]
    fn typed_access_goes_through_serde() {
        let person = Person { id: "1".into(), fname: "John".into(), age: 42 };
        let doc = Document::encode(&person).unwrap();

        assert_eq!(doc.get("_id"), Some(&json!("1")));
        assert_eq!(doc.decode::<Person>().unwrap(), person);
    }
}
