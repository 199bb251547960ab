//! An embedded document store with a Mongoose-style schema and model API.
//!
//! This crate is the core of the goosefs project and provides:
//!
//! - **Schemas** ([`schema`]) - Field types, defaults, string flags, methods, statics and hooks
//! - **Coercion** ([`coerce`]) - Turning raw JSON input into schema-conforming documents
//! - **Documents** ([`document`]) - The flat JSON record type with its `_id`
//! - **Queries** ([`query`]) - Conjunctive field-equality filters
//! - **Persistence abstraction** ([`backend`]) - Traits for loading and saving whole collections
//! - **Registry** ([`registry`]) - Registered schemas, generated models and loaded collections
//! - **Models** ([`model`]) - Collection operations and document instance operations
//! - **Engine** ([`engine`]) - The in-memory CRUD algorithms and their result types
//! - **Store** ([`store`]) - The context object tying a backend to a registry
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use goosefs_core::{store::Store, schema::{Schema, FieldSpec, FieldType}, query::Query};
//! use serde_json::json;
//!
//! let store = Store::new(backend);
//! store
//!     .register_model(
//!         "Person",
//!         Schema::new()
//!             .field("fname", FieldType::String)
//!             .field("age", FieldSpec::new(FieldType::Number).default_value(0)),
//!     )
//!     .await?;
//! store.connect().await?;
//!
//! let people = store.model("Person").await?;
//! people.new_instance(json!({ "fname": "John" }))?.save().await?;
//! let johns = people.find(Some(Query::new().eq("fname", "John"))).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as goosefs_core;

pub mod backend;
pub mod coerce;
pub mod document;
pub mod engine;
pub mod error;
pub mod model;
pub mod query;
pub mod registry;
pub mod schema;
pub mod store;
