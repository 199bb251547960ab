//! Schema-bound models and the documents built from them.
//!
//! A [`Model`] is the collection-level handle for one registered schema: it
//! exposes `find`, `find_one`, `delete_many`, `reset`, and user statics. An
//! [`Instance`] is one document built from a model; it carries `save`,
//! `update`, `remove`, `remove_one`, and user methods.
//!
//! Every mutating operation updates the in-memory collection and then writes
//! the whole collection to the backend before returning. If that write fails
//! the in-memory change stays in place and the error is returned; there is no
//! rollback.
//!
//! # Example
//!
//! ```ignore
//! use goosefs_core::{query::Query, schema::{Schema, FieldType}};
//! use serde_json::json;
//!
//! store.register_model("Person", Schema::new()
//!     .field("fname", FieldType::String)
//!     .field("lname", FieldType::String)).await?;
//!
//! let people = store.model("Person").await?;
//! let mut john = people.new_instance(json!({ "fname": "John", "lname": "Doe" }))?;
//! let saved = john.save().await?;
//! assert!(saved.was_insert());
//!
//! let found = people.find_one(Some(Query::new().eq("fname", "John"))).await?;
//! assert_eq!(found.id(), john.id());
//! ```

use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::warn;

use crate::{
    backend::StoreBackend,
    coerce::validate_document,
    document::{Document, ID_FIELD},
    engine::{self, DeleteResult, ResetResult, SaveResult, UpdateResult},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Query,
    registry::CollectionRegistry,
    schema::{SAVE_HOOK, Schema},
    store::Store,
};

/// A generated model: a collection name bound to the schema it was generated from.
#[derive(Debug)]
pub struct ModelDefinition {
    name: String,
    schema: Arc<Schema>,
}

impl ModelDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

/// Generates [`ModelDefinition`]s from registered schemas.
pub struct ModelFactory;

impl ModelFactory {
    /// Builds the model for `name` from the schema currently registered under it.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::ModelNotFound`] if `name` has no schema.
    pub fn build(registry: &CollectionRegistry, name: &str) -> DocumentStoreResult<ModelDefinition> {
        let schema = registry
            .schema(name)
            .cloned()
            .ok_or_else(|| DocumentStoreError::ModelNotFound(name.to_string()))?;

        Ok(ModelDefinition {
            name: name.to_string(),
            schema,
        })
    }
}

/// Collection-level handle for one model, borrowed from a [`Store`].
pub struct Model<'a, B: StoreBackend> {
    definition: Arc<ModelDefinition>,
    store: &'a Store<B>,
}

impl<'a, B: StoreBackend> Model<'a, B> {
    pub(crate) fn new(definition: Arc<ModelDefinition>, store: &'a Store<B>) -> Self {
        Self { definition, store }
    }

    /// The model name, which is also its collection name.
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn schema(&self) -> &Schema {
        self.definition.schema()
    }

    /// Builds an unsaved document of this model from raw input.
    ///
    /// Nothing is validated until the instance is saved or updated, except
    /// that a numeric `_id` is converted to its string form.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if `raw` is not a JSON object.
    pub fn new_instance(&self, raw: impl Into<Value>) -> DocumentStoreResult<Instance<'a, B>> {
        let mut data = Document::from_value(raw.into())?;
        if let Some(Value::Number(id)) = data.get(ID_FIELD) {
            let id = id.to_string();
            data.set(ID_FIELD, id);
        }

        Ok(Instance {
            model: self.clone(),
            data,
            stored_id: None,
        })
    }

    /// Returns the documents matching `query`, or the whole collection when `query` is `None`.
    pub async fn find(&self, query: Option<Query>) -> DocumentStoreResult<Vec<Document>> {
        let documents = self
            .store
            .read_collection(self.name(), |docs| Ok(engine::find(docs, query.as_ref())))
            .await?;

        self.store.log_operation(self.name(), "find", documents.len());
        Ok(documents)
    }

    /// Returns the first document matching every condition of `query`, as an instance.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::InvalidArgument`] if `query` is `None` or empty
    /// - [`DocumentStoreError::DocumentNotFound`] if nothing matches
    pub async fn find_one(&self, query: Option<Query>) -> DocumentStoreResult<Instance<'a, B>> {
        let query = require_query(query, "find_one")?;
        let name = self.name();

        let found = self
            .store
            .read_collection(name, |docs| Ok(engine::find_one(docs, &query).cloned()))
            .await?
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(query.to_string(), name.to_string()))?;

        self.store.log_operation(name, "find_one", 1);
        Ok(Instance {
            model: self.clone(),
            stored_id: found.id().map(str::to_owned),
            data: found,
        })
    }

    /// Removes every document matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if `query` is empty, so a
    /// missing filter can never wipe the collection.
    pub async fn delete_many(&self, query: Query) -> DocumentStoreResult<DeleteResult> {
        let query = require_query(Some(query), "delete_many")?;
        remove_where(self, &query, "delete_many").await
    }

    /// Empties this model's collection.
    pub async fn reset(&self) -> DocumentStoreResult<ResetResult> {
        let affected = self
            .store
            .write_collection(self.name(), |docs| Ok(engine::clear(docs)))
            .await?;

        self.store.log_operation(self.name(), "reset", affected);
        Ok(ResetResult { affected })
    }

    /// Invokes a static method declared on the schema.
    ///
    /// The method sees the current contents of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if no static is declared
    /// under `name`, or whatever error the static itself returns.
    pub async fn call_static(&self, name: &str, args: &[Value]) -> DocumentStoreResult<Value> {
        let method = self.schema().static_fn(name).cloned().ok_or_else(|| {
            DocumentStoreError::InvalidArgument(format!("model {} has no static `{name}`", self.name()))
        })?;

        self.store
            .read_collection(self.name(), |docs| method(docs, args))
            .await
    }
}

impl<B: StoreBackend> Clone for Model<'_, B> {
    fn clone(&self) -> Self {
        Self {
            definition: self.definition.clone(),
            store: self.store,
        }
    }
}

impl<B: StoreBackend> fmt::Debug for Model<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name())
            .field("schema", self.schema())
            .finish()
    }
}

/// One document of a model, saved or not.
///
/// Once an instance has been saved, or was read from the store, its `_id` is
/// fixed: later saves and updates always target that `_id`, whatever a hook
/// or method does to the `_id` field of the data.
pub struct Instance<'a, B: StoreBackend> {
    model: Model<'a, B>,
    data: Document,
    stored_id: Option<String>,
}

impl<'a, B: StoreBackend> Instance<'a, B> {
    pub fn model(&self) -> &Model<'a, B> {
        &self.model
    }

    /// The `_id`, once the instance has been saved or was loaded from the store,
    /// or the `_id` it was built with.
    pub fn id(&self) -> Option<&str> {
        self.stored_id.as_deref().or_else(|| self.data.id())
    }

    pub fn document(&self) -> &Document {
        &self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Sets a field on the unsaved data.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] for `_id`, which can only
    /// be chosen when the instance is built.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> DocumentStoreResult<&mut Self> {
        let field = field.into();
        if field == ID_FIELD {
            return Err(DocumentStoreError::InvalidArgument(format!(
                "`{ID_FIELD}` cannot be changed on a model instance"
            )));
        }

        self.data.set(field, value);
        Ok(self)
    }

    /// Returns the plain document, ending the chain started by `find_one`.
    pub fn exec(self) -> Document {
        self.into_document()
    }

    pub fn into_document(self) -> Document {
        self.data
    }

    /// Validates this instance, runs the `save` hook, and inserts or replaces it by `_id`.
    ///
    /// The first successful validation assigns the `_id`, which the instance
    /// keeps from then on.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Validation`] on coercion failure, the hook's
    /// error if the hook refuses, or a backend error if the flush fails.
    pub async fn save(&mut self) -> DocumentStoreResult<SaveResult> {
        let schema = self.model.definition.schema().clone();
        let mut pending = validate_document(&schema, &self.pinned(self.data.clone()))?;

        if let Some(hook) = schema.hook(SAVE_HOOK) {
            hook(&mut pending)?;
            pending = validate_document(&schema, &self.pinned(pending))?;
        }
        self.stored_id = pending.id().map(str::to_owned);
        self.data = pending.clone();

        let name = self.model.name();
        let document = pending.clone();
        let updated = self
            .model
            .store
            .write_collection(name, move |docs| Ok(engine::upsert(docs, pending)))
            .await?;

        self.model.store.log_operation(name, "save", updated);
        Ok(SaveResult { document, updated })
    }

    /// Re-validates this instance and replaces the stored document with the same `_id`.
    ///
    /// Unlike [`Instance::save`], an update never inserts: if no stored document
    /// has this `_id`, the collection is left unchanged and `affected` is `0`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if the instance has no `_id`.
    pub async fn update(&mut self) -> DocumentStoreResult<UpdateResult> {
        self.require_id()?;

        let document = validate_document(self.model.schema(), &self.pinned(self.data.clone()))?;
        self.data = document.clone();

        let name = self.model.name();
        let affected = self
            .model
            .store
            .write_collection(name, |docs| Ok(engine::replace(docs, &document)))
            .await?;

        if affected == 0 {
            warn!(collection = name, id = ?document.id(), "update matched no stored document");
        }
        self.model.store.log_operation(name, "update", affected);

        if affected > 0 {
            self.stored_id = document.id().map(str::to_owned);
        }

        Ok(UpdateResult { document, affected })
    }

    /// Removes documents from this instance's collection.
    ///
    /// With `None`, removes the stored document with this instance's `_id`.
    /// With a query, removes every document matching it.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if `query` is `None` and
    /// the instance has no `_id`, or if `query` is empty.
    pub async fn remove(&self, query: Option<Query>) -> DocumentStoreResult<DeleteResult> {
        let query = match query {
            Some(query) => require_query(Some(query), "remove")?,
            None => Query::by_id(self.require_id()?),
        };

        remove_where(&self.model, &query, "remove").await
    }

    /// Removes exactly the stored document with this instance's `_id` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if that `_id` is no
    /// longer stored, in which case nothing is written.
    pub async fn remove_one(&self) -> DocumentStoreResult<Document> {
        let id = self.require_id()?;
        let name = self.model.name();

        let removed = self
            .model
            .store
            .write_collection(name, |docs| {
                engine::remove_by_id(docs, id)
                    .ok_or_else(|| DocumentStoreError::DocumentNotFound(id.to_string(), name.to_string()))
            })
            .await?;

        self.model.store.log_operation(name, "remove_one", 1);
        Ok(removed)
    }

    /// Invokes an instance method declared on the schema against this document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if no method is declared
    /// under `name`, or whatever error the method itself returns.
    pub fn call_method(&mut self, name: &str, args: &[Value]) -> DocumentStoreResult<Value> {
        let method = self.model.schema().method_fn(name).cloned().ok_or_else(|| {
            DocumentStoreError::InvalidArgument(format!(
                "model {} has no method `{name}`",
                self.model.name()
            ))
        })?;

        method(&mut self.data, args)
    }

    fn require_id(&self) -> DocumentStoreResult<&str> {
        self.id()
            .ok_or_else(|| DocumentStoreError::InvalidArgument("Item _id required".into()))
    }

    /// Puts the fixed `_id`, if any, back onto `data`.
    fn pinned(&self, mut data: Document) -> Document {
        if let Some(id) = self.id() {
            data.set(ID_FIELD, id);
        }
        data
    }
}

impl<B: StoreBackend> fmt::Debug for Instance<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("model", &self.model.name())
            .field("data", &self.data)
            .finish()
    }
}

fn require_query(query: Option<Query>, operation: &str) -> DocumentStoreResult<Query> {
    match query {
        None => Err(DocumentStoreError::InvalidArgument(format!(
            "{operation}: no query specified"
        ))),
        Some(query) if query.is_empty() => Err(DocumentStoreError::InvalidArgument(format!(
            "{operation}: query must name at least one field"
        ))),
        Some(query) => Ok(query),
    }
}

async fn remove_where<B: StoreBackend>(
    model: &Model<'_, B>,
    query: &Query,
    operation: &str,
) -> DocumentStoreResult<DeleteResult> {
    let name = model.name();
    let deleted = model
        .store
        .write_collection(name, |docs| Ok(engine::remove_matching(docs, query)))
        .await?;

    if deleted == 0 {
        warn!(collection = name, %query, "{operation} matched no stored document");
    }
    model.store.log_operation(name, operation, deleted);

    Ok(DeleteResult::new(deleted))
}
