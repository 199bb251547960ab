//! Volatile storage implementation for document stores.
//!
//! Collections are kept as whole vectors of documents in a `HashMap` behind an
//! async-aware read-write lock.

use async_trait::async_trait;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};

use goosefs_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::Document,
    error::DocumentStoreResult,
};

type StoreMap = HashMap<String, Vec<Document>>;

/// Thread-safe in-memory persistence backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// clones share the same collections. Saving a collection replaces its stored
/// vector under the write lock, which keeps saves whole.
///
/// # Example
///
/// ```ignore
/// use goosefs_memory::InMemoryStore;
/// use goosefs_core::backend::StoreBackend;
///
/// let backend = InMemoryStore::new();
/// assert!(backend.load_collection("Person").await?.is_empty());
/// assert!(backend.collection_exists("Person").await?);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> persisted documents
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new backend holding no collections.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Seeds `collection` with `documents`, as if they had been saved earlier.
    pub async fn seed(&self, collection: &str, documents: Vec<Document>) {
        self.store
            .write()
            .await
            .insert(collection.to_string(), documents);
    }

    /// Returns a copy of what is currently persisted for `collection`.
    pub async fn snapshot(&self, collection: &str) -> Option<Vec<Document>> {
        self.store.read().await.get(collection).cloned()
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn collection_exists(&self, collection: &str) -> DocumentStoreResult<bool> {
        Ok(self.store.read().await.contains_key(collection))
    }

    async fn load_collection(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        Ok(self
            .store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .clone())
    }

    async fn save_collection(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .insert(collection.to_string(), documents.to_vec());

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new, empty [`InMemoryStore`].
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
