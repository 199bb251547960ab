//! Convenient re-exports of commonly used types from goosefs.
//!
//! ```ignore
//! use goosefs::prelude::*;
//! ```
//!
//! This provides access to the store and its models, schemas, documents,
//! queries, operation results, backend traits, and error types.

pub use goosefs_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::{Document, ID_FIELD},
    engine::{DeleteResult, ResetResult, SaveResult, UpdateResult},
    error::{DocumentStoreError, DocumentStoreResult},
    model::{Instance, Model},
    query::Query,
    schema::{FieldSpec, FieldType, SAVE_HOOK, Schema},
    store::{ConnectOptions, Store},
};
