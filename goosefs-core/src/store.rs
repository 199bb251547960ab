//! The store: one explicit context object owning every collection.
//!
//! A [`Store`] pairs a persistence backend with a [`CollectionRegistry`]
//! behind an async read-write lock. All mutation of a collection happens under
//! the write lock, including the flush to the backend, so the in-memory
//! contents and the persisted copy change together from the point of view of
//! other tasks in this process.
//!
//! # Example
//!
//! ```ignore
//! use goosefs_core::{store::Store, schema::{Schema, FieldType}};
//!
//! let store = Store::new(backend);
//! store.register_model("User", Schema::new().field("fname", FieldType::String)).await?;
//! store.connect().await?;
//!
//! let users = store.model("User").await?;
//! let everyone = users.find(None).await?;
//! ```

use mea::rwlock::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};
use tracing::{debug, info};

use crate::{
    backend::StoreBackend,
    document::Document,
    error::{DocumentStoreError, DocumentStoreResult},
    model::Model,
    registry::{CollectionRegistry, ModelDescriptor},
    schema::Schema,
};

/// Options accepted by [`Store::connect_with`].
///
/// Reserved for selecting a backing store at connect time; no option has an effect yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {}

#[derive(Debug)]
pub struct Store<B: StoreBackend> {
    backend: B,
    registry: RwLock<CollectionRegistry>,
    debug: AtomicBool,
}

impl<B: StoreBackend> Store<B> {
    /// Creates a store over `backend` with no schemas registered and nothing loaded.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: RwLock::new(CollectionRegistry::new()),
            debug: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Turns per-operation debug events on or off.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Registers `schema` under `name`, replacing any earlier registration.
    ///
    /// Models already handed out keep the schema they were generated from.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] for names that cannot
    /// name a collection; see [`CollectionRegistry::register_schema`].
    pub async fn register_model(&self, name: impl Into<String>, schema: Schema) -> DocumentStoreResult<ModelDescriptor> {
        self.registry
            .write()
            .await
            .register_schema(name, schema)
    }

    /// Returns the model for `name`, generating it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::ModelNotFound`] if no schema was registered under `name`.
    pub async fn model(&self, name: &str) -> DocumentStoreResult<Model<'_, B>> {
        let definition = self.registry.write().await.model(name)?;
        Ok(Model::new(definition, self))
    }

    /// Loads every registered collection from the backend, in name order.
    ///
    /// Calling it again reloads from the backend, replacing the in-memory contents.
    pub async fn connect(&self) -> DocumentStoreResult<()> {
        info!("initializing store: loading collections");
        let started = Instant::now();

        let mut registry = self.registry.write().await;
        let names = registry
            .schema_names()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        for name in &names {
            let documents = self.backend.load_collection(name).await?;
            registry.insert_collection(name.clone(), documents);
        }

        info!(collections = names.len(), elapsed = ?started.elapsed(), "collections loaded");
        Ok(())
    }

    /// Mongoose-shaped form of [`Store::connect`].
    ///
    /// `uri` and `options` are accepted for forward compatibility and otherwise ignored.
    pub async fn connect_with(&self, uri: Option<&str>, options: Option<ConnectOptions>) -> DocumentStoreResult<()> {
        debug!(?uri, ?options, "connect options are not used by this store");
        self.connect().await
    }

    /// Drops every collection from memory without touching the backend.
    ///
    /// Collections are loaded again on their next use.
    pub async fn disconnect(&self) {
        self.registry.write().await.unload_all();
        info!("store disconnected: in-memory collections dropped");
    }

    /// Empties every registered or loaded collection and flushes each one.
    ///
    /// This is destructive and cannot be undone.
    pub async fn reset_all(&self) -> DocumentStoreResult<()> {
        let mut registry = self.registry.write().await;

        let mut names = registry
            .schema_names()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        names.extend(registry.loaded_names());
        names.sort();
        names.dedup();

        for name in &names {
            registry.insert_collection(name.clone(), Vec::new());
            self.backend.save_collection(name, &[]).await?;
        }

        info!(collections = names.len(), "all collections reset");
        Ok(())
    }

    /// Registered model names in lexicographic order.
    pub async fn collection_names(&self) -> Vec<String> {
        self.registry
            .read()
            .await
            .schema_names()
            .map(str::to_owned)
            .collect()
    }

    pub async fn is_loaded(&self, name: &str) -> bool {
        self.registry.read().await.is_loaded(name)
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await
    }

    /// Runs `f` over the in-memory contents of `name`, loading it first if needed.
    pub(crate) async fn read_collection<T, F>(&self, name: &str, f: F) -> DocumentStoreResult<T>
    where
        F: FnOnce(&[Document]) -> DocumentStoreResult<T> + Send,
        T: Send,
    {
        {
            let registry = self.registry.read().await;
            if let Some(documents) = registry.collection(name) {
                return f(documents);
            }
        }

        let mut registry = self.registry.write().await;
        let documents = self.ensure_loaded(&mut registry, name).await?;
        f(documents.as_slice())
    }

    /// Runs `f` over the in-memory contents of `name` and flushes the whole
    /// collection to the backend if `f` succeeds.
    pub(crate) async fn write_collection<T, F>(&self, name: &str, f: F) -> DocumentStoreResult<T>
    where
        F: FnOnce(&mut Vec<Document>) -> DocumentStoreResult<T> + Send,
        T: Send,
    {
        let mut registry = self.registry.write().await;
        let documents = self.ensure_loaded(&mut registry, name).await?;

        let output = f(&mut *documents)?;
        self.backend
            .save_collection(name, documents.as_slice())
            .await?;

        Ok(output)
    }

    pub(crate) fn log_operation(&self, collection: &str, operation: &str, affected: usize) {
        if self.is_debug() {
            debug!(collection, operation, affected, "model operation");
        }
    }

    async fn ensure_loaded<'r>(
        &self,
        registry: &'r mut CollectionRegistry,
        name: &str,
    ) -> DocumentStoreResult<&'r mut Vec<Document>> {
        if !registry.is_loaded(name) {
            debug!(collection = name, "loading collection on first use");
            let documents = self.backend.load_collection(name).await?;
            registry.insert_collection(name, documents);
        }

        registry
            .collection_mut(name)
            .ok_or_else(|| DocumentStoreError::ModelNotFound(name.to_string()))
    }
}
