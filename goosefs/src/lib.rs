//! An embedded JSON document store with a Mongoose-style schema and model API.
//!
//! This crate is the primary entry point for users of goosefs. It re-exports
//! the core types from `goosefs-core` and the storage backends from their own
//! crates.
//!
//! Each collection is held in memory as an ordered list of flat JSON objects
//! and persisted, after every mutation, as one JSON array in
//! `{data_dir}/{lowercase(name)}.data.json`.
//!
//! # Quick Start
//!
//! ```ignore
//! use goosefs::{prelude::*, file::JsonFileStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let store = Store::new(JsonFileStore::builder().data_dir("./data").build().await?);
//!
//!     store
//!         .register_model(
//!             "Person",
//!             Schema::new()
//!                 .field("fname", FieldSpec::new(FieldType::String).trim())
//!                 .field("lname", FieldType::String)
//!                 .field("age", FieldSpec::new(FieldType::Number).default_value(0)),
//!         )
//!         .await?;
//!     store.connect().await?;
//!
//!     let people = store.model("Person").await?;
//!
//!     // Insert, then find the document again by field equality
//!     let mut john = people.new_instance(json!({ "fname": "John", "lname": "Doe" }))?;
//!     john.save().await?;
//!
//!     let found = people
//!         .find_one(Some(Query::new().eq("fname", "John")))
//!         .await?
//!         .exec();
//!     println!("found {found:?}");
//!
//!     // Remove it again
//!     let result = people.delete_many(Query::new().eq("lname", "Doe")).await?;
//!     assert_eq!(result.deleted_count, 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`file`] - One JSON file per collection on the local filesystem
//! - [`memory`] - Process-local storage for development and testing (requires the `memory` feature)

pub mod prelude;

pub use goosefs_core::{backend, coerce, document, engine, error, model, query, registry, schema, store};

/// JSON file storage backend.
pub mod file {
    pub use goosefs_file::{FILE_SUFFIX, JsonFileStore, JsonFileStoreBuilder, JsonFileStoreConfig};
}

/// In-memory storage backend implementations.
///
/// This module is only available when the `memory` feature is enabled.
#[cfg(feature = "memory")]
pub mod memory {
    pub use goosefs_memory::{InMemoryStore, InMemoryStoreBuilder};
}
