//! In-memory persistence backend for goosefs.
//!
//! This crate provides a thread-safe, volatile implementation of the
//! `StoreBackend` trait. Nothing outlives the process, which makes it a good
//! fit for tests and for stores that only need the model API.
//!
//! # Quick Start
//!
//! ```ignore
//! use goosefs::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::new(InMemoryStore::builder().build().await?);
//!     store.register_model("Person", Schema::new().field("fname", FieldType::String)).await?;
//!     store.connect().await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as goosefs_memory;

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
