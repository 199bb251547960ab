//! Declarative description of a document shape.
//!
//! A [`Schema`] is an ordered list of fields, each with a [`FieldSpec`], plus three
//! capability maps: instance methods, static methods, and lifecycle hooks. Schemas
//! validate nothing when they are built; malformed input only surfaces when a
//! document is coerced against the schema.
//!
//! # Example
//!
//! ```ignore
//! use goosefs_core::schema::{Schema, FieldSpec, FieldType};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("fname", FieldSpec::new(FieldType::String).trim())
//!     .field("email", FieldSpec::new(FieldType::String).lowercase())
//!     .field("age", FieldSpec::new(FieldType::Number).default_value(0))
//!     .field("created", FieldSpec::new(FieldType::Date).default_with(|| json!(1_700_000_000_000_i64)))
//!     .pre("save", |doc| {
//!         doc.set("touched", true);
//!         Ok(())
//!     });
//! ```

use serde_json::Value;
use std::{collections::HashMap, fmt, sync::Arc};

use crate::{document::Document, error::DocumentStoreResult};

/// Name of the only lifecycle hook the engine dispatches today.
pub const SAVE_HOOK: &str = "save";

/// The primitive types a field can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "String",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Array => "Array",
            FieldType::Object => "Object",
            FieldType::Date => "Date",
        };
        f.write_str(name)
    }
}

/// Zero-argument producer used for computed defaults such as "now".
pub type DefaultProducer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Instance method: receives the document it was called on plus call arguments.
pub type MethodFn = Arc<dyn Fn(&mut Document, &[Value]) -> DocumentStoreResult<Value> + Send + Sync>;

/// Static method: receives a read-only view of the model's collection plus call arguments.
pub type StaticFn = Arc<dyn Fn(&[Document], &[Value]) -> DocumentStoreResult<Value> + Send + Sync>;

/// Lifecycle hook: receives the pending document and may modify it.
///
/// Returning `Ok(())` is the "done" signal that lets the operation continue;
/// returning an error aborts it before anything is written.
pub type HookFn = Arc<dyn Fn(&mut Document) -> DocumentStoreResult<()> + Send + Sync>;

/// A field default: either a literal value or a producer evaluated per document.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Producer(DefaultProducer),
}

impl DefaultValue {
    /// Produces the default value for one document.
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Producer(producer) => producer(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Declaration of a single field: its type, an optional default, and string flags.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    field_type: FieldType,
    default: Option<DefaultValue>,
    trim: bool,
    lowercase: bool,
    required: bool,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            default: None,
            trim: false,
            lowercase: false,
            required: false,
        }
    }

    /// Sets a literal default applied when the input has no value for this field.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Sets a computed default, evaluated once per validated document.
    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Producer(Arc::new(producer)));
        self
    }

    /// Strip leading and trailing whitespace from string input.
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Lowercase string input.
    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    /// Reject documents that have neither a value nor a default for this field.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn is_trim(&self) -> bool {
        self.trim
    }

    pub fn is_lowercase(&self) -> bool {
        self.lowercase
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl From<FieldType> for FieldSpec {
    fn from(field_type: FieldType) -> Self {
        FieldSpec::new(field_type)
    }
}

/// Field declarations plus the method, static, and hook capabilities of one document shape.
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
    methods: HashMap<String, MethodFn>,
    statics: HashMap<String, StaticFn>,
    hooks: HashMap<String, HookFn>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from `(name, spec)` pairs, keeping their order.
    ///
    /// A field declared twice keeps its first position and its last spec.
    pub fn define<I, K, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<FieldSpec>,
    {
        fields
            .into_iter()
            .fold(Self::new(), |schema, (name, spec)| schema.field(name, spec))
    }

    /// Adds (or replaces) a field declaration.
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        let name = name.into();
        let spec = spec.into();

        match self.fields.iter().position(|(existing, _)| *existing == name) {
            Some(index) => self.fields[index].1 = spec,
            None => self.fields.push((name, spec)),
        }
        self
    }

    /// Adds an instance method callable on documents of this shape.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Document, &[Value]) -> DocumentStoreResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Adds a static method callable on the model itself.
    pub fn static_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&[Document], &[Value]) -> DocumentStoreResult<Value> + Send + Sync + 'static,
    {
        self.statics.insert(name.into(), Arc::new(method));
        self
    }

    /// Builder form of [`Schema::register_hook`].
    pub fn pre<F>(mut self, hook: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Document) -> DocumentStoreResult<()> + Send + Sync + 'static,
    {
        self.register_hook(hook, handler);
        self
    }

    /// Records a lifecycle hook under `hook`, replacing any earlier handler.
    ///
    /// Only [`SAVE_HOOK`] is dispatched by the engine; other names are stored
    /// but never invoked.
    pub fn register_hook<F>(&mut self, hook: impl Into<String>, handler: F)
    where
        F: Fn(&mut Document) -> DocumentStoreResult<()> + Send + Sync + 'static,
    {
        self.hooks.insert(hook.into(), Arc::new(handler));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn method_fn(&self, name: &str) -> Option<&MethodFn> {
        self.methods.get(name)
    }

    pub fn static_fn(&self, name: &str) -> Option<&StaticFn> {
        self.statics.get(name)
    }

    pub fn hook(&self, name: &str) -> Option<&HookFn> {
        self.hooks.get(name)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods = self.methods.keys().collect::<Vec<_>>();
        let mut statics = self.statics.keys().collect::<Vec<_>>();
        let mut hooks = self.hooks.keys().collect::<Vec<_>>();
        methods.sort();
        statics.sort();
        hooks.sort();

        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("methods", &methods)
            .field("statics", &statics)
            .field("hooks", &hooks)
            .finish()
    }
}
