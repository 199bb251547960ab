//! Field-equality queries over documents.
//!
//! A [`Query`] is an ordered conjunction of `field == value` conditions. Every
//! operation that accepts a query matches a document only when all of its
//! conditions hold. Equality is value equality; numbers compare numerically so
//! `42` and `42.0` are equal, while `42` and `"42"` are not.
//!
//! # Example
//!
//! ```ignore
//! use goosefs_core::query::Query;
//! use serde_json::json;
//!
//! let query = Query::new().eq("fname", "John").eq("age", 42);
//! let same = Query::try_from(json!({ "fname": "John", "age": 42 })).unwrap();
//! ```

use serde_json::{Map, Value};
use std::{collections::HashMap, fmt};

use crate::{
    document::{Document, ID_FIELD, kind_of},
    error::DocumentStoreError,
};

/// A conjunction of field-equality conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<(String, Value)>,
}

impl Query {
    /// Creates an empty query. An empty query matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query matching the document with the given `_id`.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_FIELD, id.into())
    }

    /// Adds a `field == value` condition. A repeated field keeps only its last value.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();

        match self.conditions.iter().position(|(existing, _)| *existing == field) {
            Some(index) => self.conditions[index].1 = value,
            None => self.conditions.push((field, value)),
        }
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns `true` when every condition holds for `document`.
    ///
    /// A condition on a field the document does not have never holds.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            document
                .get(field)
                .is_some_and(|actual| Comparable::from(actual) == Comparable::from(expected))
        })
    }
}

impl TryFrom<Value> for Query {
    type Error = DocumentStoreError;

    /// Converts a JSON object such as `{"fname": "John"}` into a query.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .fold(Query::new(), |query, (field, value)| query.eq(field, value))),
            other => Err(DocumentStoreError::InvalidArgument(format!(
                "a query must be a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self
            .conditions
            .iter()
            .cloned()
            .collect::<Map<String, Value>>();
        write!(f, "{}", Value::Object(map))
    }
}

/// Comparable view of a JSON value with numbers normalized to `f64`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Value> for Comparable<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Comparable::Null,
            Value::Bool(value) => Comparable::Bool(*value),
            Value::Number(value) => value
                .as_f64()
                .map(Comparable::Number)
                .unwrap_or(Comparable::Null),
            Value::String(value) => Comparable::String(value),
            Value::Array(items) => Comparable::Array(items.iter().map(Comparable::from).collect()),
            Value::Object(map) => Comparable::Map(
                map.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}
