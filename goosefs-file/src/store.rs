//! File-backed storage implementation for document stores.

use async_trait::async_trait;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tokio::task;
use tracing::{info, warn};

use goosefs_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::Document,
    error::{DocumentStoreError, DocumentStoreResult},
};

use crate::config::JsonFileStoreConfig;

/// Suffix appended to the lowercased collection name to form its file name.
pub const FILE_SUFFIX: &str = ".data.json";

/// Persistence backend keeping one JSON file per collection.
///
/// # Example
///
/// ```ignore
/// use goosefs_file::JsonFileStore;
///
/// let backend = JsonFileStore::builder().data_dir("./test/").build().await?;
/// assert_eq!(backend.file_path("Person"), std::path::Path::new("./test/person.data.json"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: JsonFileStoreConfig,
}

impl JsonFileStore {
    /// Creates a backend from `config`. Nothing is touched on disk until first use.
    pub fn new(mut config: JsonFileStoreConfig) -> Self {
        // "./data/" and "./data" name the same directory
        config.data_dir = config.data_dir.components().collect();
        Self { config }
    }

    pub fn builder() -> JsonFileStoreBuilder {
        JsonFileStoreBuilder::default()
    }

    pub fn config(&self) -> &JsonFileStoreConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of the file backing `collection`.
    pub fn file_path(&self, collection: &str) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}{FILE_SUFFIX}", collection.to_lowercase()))
    }

    /// Like [`JsonFileStore::file_path`], but refuses names that would leave the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] for an empty name, `.`,
    /// `..`, or a name containing a path separator.
    pub fn checked_file_path(&self, collection: &str) -> DocumentStoreResult<PathBuf> {
        let escapes = collection.is_empty()
            || collection == "."
            || collection == ".."
            || collection.contains(['/', '\\', '\0']);

        if escapes {
            return Err(DocumentStoreError::InvalidArgument(format!(
                "`{collection}` cannot name a collection file"
            )));
        }
        Ok(self.file_path(collection))
    }

    /// Creates the data directory, and any missing parents, if it does not exist.
    pub fn ensure_dir_exists(&self) -> DocumentStoreResult<()> {
        let dir = self.data_dir();
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }

        info!(path = %dir.display(), "data directory not found, creating it");
        fs::create_dir_all(dir).map_err(|err| io_error(dir, err))
    }

    /// Reports whether `collection` has a file, creating the data directory first.
    pub fn exists(&self, collection: &str) -> DocumentStoreResult<bool> {
        let path = self.checked_file_path(collection)?;
        self.ensure_dir_exists()?;

        path.try_exists().map_err(|err| io_error(&path, err))
    }

    /// Reads the full contents of `collection`.
    ///
    /// A missing file is created holding `[]`. An empty (or whitespace-only)
    /// file reads as an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::CorruptData`] if the file is not a JSON
    /// array of objects, or [`DocumentStoreError::Io`] if it cannot be read.
    pub fn load(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let path = self.checked_file_path(collection)?;

        if !self.exists(collection)? {
            info!(collection, path = %path.display(), "collection not found, creating new collection");
            self.save(collection, &[])?;
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path).map_err(|err| io_error(&path, err))?;
        info!(collection, bytes = contents.len(), "loaded collection");

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<Document>>(&contents).map_err(|err| DocumentStoreError::CorruptData {
            collection: collection.to_string(),
            reason: format!("{}: {err}", path.display()),
        })
    }

    /// Replaces the file of `collection` with `documents`.
    ///
    /// The new contents are written to a temporary sibling file, synced, and
    /// renamed over the target.
    pub fn save(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        let path = self.checked_file_path(collection)?;
        self.ensure_dir_exists()?;

        let bytes = if self.config.pretty {
            serde_json::to_vec_pretty(documents)?
        } else {
            serde_json::to_vec(documents)?
        };

        let staging = path.with_extension("json.tmp");

        if let Err(err) = write_synced(&staging, &bytes) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                warn!(path = %staging.display(), error = %cleanup, "could not remove staging file");
            }
            return Err(io_error(&staging, err));
        }

        fs::rename(&staging, &path).map_err(|err| io_error(&path, err))
    }

    /// Runs `f` against a clone of this backend on tokio's blocking thread pool.
    async fn blocking<T, F>(&self, f: F) -> DocumentStoreResult<T>
    where
        F: FnOnce(JsonFileStore) -> DocumentStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        task::spawn_blocking(move || f(store))
            .await
            .map_err(|err| DocumentStoreError::Io(format!("file task did not complete: {err}")))?
    }
}

/// File access runs on tokio's blocking thread pool; a tokio runtime must be running.
#[async_trait]
impl StoreBackend for JsonFileStore {
    async fn collection_exists(&self, collection: &str) -> DocumentStoreResult<bool> {
        let collection = collection.to_string();
        self.blocking(move |store| store.exists(&collection)).await
    }

    async fn load_collection(&self, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let collection = collection.to_string();
        self.blocking(move |store| store.load(&collection)).await
    }

    async fn save_collection(&self, collection: &str, documents: &[Document]) -> DocumentStoreResult<()> {
        let collection = collection.to_string();
        let documents = documents.to_vec();
        self.blocking(move |store| store.save(&collection, &documents)).await
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn io_error(path: &Path, err: std::io::Error) -> DocumentStoreError {
    DocumentStoreError::Io(format!("{}: {err}", path.display()))
}

/// Builder for constructing [`JsonFileStore`] instances.
///
/// # Example
///
/// ```ignore
/// use goosefs_file::JsonFileStore;
/// use goosefs_core::backend::StoreBackendBuilder;
///
/// let backend = JsonFileStore::builder()
///     .data_dir("/var/lib/app/data")
///     .pretty(true)
///     .build()
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonFileStoreBuilder {
    config: JsonFileStoreConfig,
}

impl JsonFileStoreBuilder {
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = data_dir.into();
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    /// Replaces every setting with `config`.
    pub fn config(mut self, config: JsonFileStoreConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for JsonFileStoreBuilder {
    type Backend = JsonFileStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(JsonFileStore::new(self.config))
    }
}
