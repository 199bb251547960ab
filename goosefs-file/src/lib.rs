//! JSON-file persistence backend for goosefs.
//!
//! Each collection lives in one file, `{data_dir}/{lowercase name}.data.json`,
//! holding a JSON array of document objects. Files are rewritten whole on
//! every save, through a temporary sibling file that is renamed over the
//! target, so a crash mid-write leaves the previous contents intact.
//!
//! Two processes sharing one data directory are not coordinated in any way.
//!
//! # Quick Start
//!
//! ```ignore
//! use goosefs::{prelude::*, file::JsonFileStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = JsonFileStore::builder().data_dir("./data").build().await?;
//!     let store = Store::new(backend);
//!     store.register_model("Person", Schema::new().field("fname", FieldType::String)).await?;
//!     store.connect().await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as goosefs_file;

pub mod config;
pub mod store;

pub use config::JsonFileStoreConfig;
pub use store::{FILE_SUFFIX, JsonFileStore, JsonFileStoreBuilder};
