//! The collection registry: schemas, generated models, and loaded collections.
//!
//! A [`CollectionRegistry`] is owned by one [`Store`](crate::store::Store) and
//! is the single source of truth for which collections are loaded into memory.
//! Schema names are kept in lexicographic order so bulk operations visit
//! collections deterministically.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::{
    document::Document,
    error::{DocumentStoreError, DocumentStoreResult},
    model::{ModelDefinition, ModelFactory},
    schema::Schema,
};

/// What [`CollectionRegistry::register_schema`] hands back: the name and the
/// schema now registered under it.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub name: String,
    pub schema: Arc<Schema>,
}

#[derive(Debug, Default)]
pub struct CollectionRegistry {
    schemas: BTreeMap<String, Arc<Schema>>,
    models: HashMap<String, Arc<ModelDefinition>>,
    collections: HashMap<String, Vec<Document>>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` under `name`, replacing any earlier registration.
    ///
    /// The cached model for `name` is evicted so the next lookup generates one
    /// from the new schema. Model handles generated earlier keep the schema they
    /// were built with.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if `name` is empty, looks
    /// like a path (`/`, `\`, `.` or `..`), or differs only in case from a
    /// name already registered. File backends store collections under the
    /// lowercased name.
    pub fn register_schema(&mut self, name: impl Into<String>, schema: Schema) -> DocumentStoreResult<ModelDescriptor> {
        let name = name.into();
        check_model_name(&name)?;

        if let Some(existing) = self
            .schemas
            .keys()
            .find(|existing| **existing != name && existing.to_lowercase() == name.to_lowercase())
        {
            return Err(DocumentStoreError::InvalidArgument(format!(
                "model `{name}` collides with registered model `{existing}`"
            )));
        }

        let schema = Arc::new(schema);
        self.schemas.insert(name.clone(), schema.clone());
        self.models.remove(&name);

        Ok(ModelDescriptor { name, schema })
    }

    pub fn schema(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Registered schema names in lexicographic order.
    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Returns the model generated for `name`, generating and caching it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::ModelNotFound`](crate::error::DocumentStoreError::ModelNotFound)
    /// if no schema was registered under `name`.
    pub fn model(&mut self, name: &str) -> DocumentStoreResult<Arc<ModelDefinition>> {
        if let Some(model) = self.models.get(name) {
            return Ok(model.clone());
        }

        let model = Arc::new(ModelFactory::build(self, name)?);
        self.models.insert(name.to_string(), model.clone());

        Ok(model)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Names of the collections currently held in memory, sorted.
    pub fn loaded_names(&self) -> Vec<String> {
        let mut names = self.collections.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Installs `documents` as the in-memory contents of `name`, replacing what was there.
    pub fn insert_collection(&mut self, name: impl Into<String>, documents: Vec<Document>) {
        self.collections.insert(name.into(), documents);
    }

    pub fn collection(&self, name: &str) -> Option<&[Document]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    pub fn collection_mut(&mut self, name: &str) -> Option<&mut Vec<Document>> {
        self.collections.get_mut(name)
    }

    /// Drops every in-memory collection. Nothing is written anywhere.
    pub fn unload_all(&mut self) {
        self.collections.clear();
    }
}

fn check_model_name(name: &str) -> DocumentStoreResult<()> {
    let path_like = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if path_like {
        return Err(DocumentStoreError::InvalidArgument(format!(
            "`{name}` is not a valid model name"
        )));
    }
    Ok(())
}
