//! Persistence backend abstraction for the document store.
//!
//! A backend owns the durable copy of each collection. The store keeps the
//! working copy in memory and hands a backend the complete contents of a
//! collection after every mutation, so backends only ever load and overwrite
//! whole collections.
//!
//! # Traits
//!
//! - [`StoreBackend`]: load/save whole collections
//! - [`StoreBackendBuilder`]: factory trait for creating backend instances
//!
//! # Example
//!
//! ```ignore
//! use goosefs_core::backend::StoreBackend;
//! use goosefs_core::document::Document;
//!
//! let docs = backend.load_collection("Person").await?;
//! backend.save_collection("Person", &docs).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{document::Document, error::DocumentStoreResult};

/// Abstract interface for collection persistence.
///
/// # Consistency
///
/// Implementations must make [`StoreBackend::save_collection`] replace the
/// previous contents as a whole: a reader of the backend sees either the old
/// collection or the new one, never a mix. Coordination between processes
/// sharing one backend is not part of the contract.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Reports whether the backend holds a copy of `collection`.
    ///
    /// Backends may prepare shared resources (such as a data directory) as a
    /// side effect.
    async fn collection_exists(&self, collection: &str) -> DocumentStoreResult<bool>;

    /// Loads the full contents of `collection`.
    ///
    /// A collection the backend has never seen is created empty and returned
    /// as an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::CorruptData`](crate::error::DocumentStoreError::CorruptData)
    /// if the stored contents cannot be decoded, or
    /// [`DocumentStoreError::Io`](crate::error::DocumentStoreError::Io) on access failures.
    async fn load_collection(&self, collection: &str) -> DocumentStoreResult<Vec<Document>>;

    /// Replaces the stored contents of `collection` with `documents`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Io`](crate::error::DocumentStoreError::Io)
    /// if the write fails. Failures are not retried.
    async fn save_collection(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()>;

    /// Releases backend resources. The default implementation does nothing.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn collection_exists(&self, collection: &str) -> DocumentStoreResult<bool> {
        (*self).collection_exists(collection).await
    }

    async fn load_collection(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        (*self).load_collection(collection).await
    }

    async fn save_collection(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        (*self)
            .save_collection(collection, documents)
            .await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
