//! Task definitions and the compiled schema used by the Binding Engine.
//!
//! A [`TaskDefinition`] declares the accessor surface of one task type:
//! every field's internal name, declared type, optional source key,
//! optional default literal, and optional fallback implementation.
//! [`TaskSchema::build`] compiles a definition into the key-to-fields
//! grouping the Binding Engine walks: keyed by source key in Config
//! mode, by internal name in Task mode. That grouping is what lets
//! several differently-typed fields be driven by one config value while
//! task-mode round-trips stay exact.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::task::MaterializedTask;
use crate::value::FieldValue;

/// How a tree is interpreted during binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Config trees: keys are declared source keys, defaults apply.
    Config,
    /// Task trees: keys are internal names, no defaulting. Task trees
    /// come from a prior dump and are expected to be complete.
    Task,
}

/// A reference to a field's declared type.
///
/// Codec lookup is structural: wrappers unwrap to the codec of their
/// inner type, and [`TypeRef::Named`] resolves against extension codecs
/// registered on the [`CodecRegistry`](crate::codec::CodecRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A boolean field.
    Boolean,
    /// An integer field (`i64`, widened from narrower inputs).
    Integer,
    /// A binary floating-point field.
    Float,
    /// An arbitrary-precision decimal field.
    Decimal,
    /// A text field.
    String,
    /// A raw tree fragment carried through without decoding.
    Json,
    /// A character-set name field.
    Charset,
    /// A timezone-identifier field.
    ZoneId,
    /// An optional wrapper: `null` and absence are legal for this field.
    Optional(Box<TypeRef>),
    /// An ordered list of the inner type.
    List(Box<TypeRef>),
    /// An ordered string-keyed map of the inner type.
    Map(Box<TypeRef>),
    /// An extension type resolved by name against the codec registry.
    Named(String),
}

impl TypeRef {
    /// Wrap this type as optional.
    pub fn optional(self) -> Self {
        TypeRef::Optional(Box::new(self))
    }

    /// Wrap this type as a list element type.
    pub fn list(self) -> Self {
        TypeRef::List(Box::new(self))
    }

    /// Wrap this type as a map value type.
    pub fn map(self) -> Self {
        TypeRef::Map(Box::new(self))
    }

    /// An extension type reference by registered name.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Whether `null` (and absence) is legal for this type.
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeRef::Optional(_))
    }
}

/// A fallback implementation invoked when a field is absent from the
/// Backing Store; the runtime counterpart of an accessor with a
/// non-binding default body.
pub type FallbackFn = dyn Fn(&MaterializedTask) -> FieldValue + Send + Sync;

/// One field of a task definition.
///
/// Two fields of one definition may share a source key (field
/// duplication: one config value drives several differently-typed
/// fields) but never an internal name.
#[derive(Clone)]
pub struct FieldSpec {
    internal_name: String,
    declared_type: TypeRef,
    config_key: Option<String>,
    default_literal: Option<String>,
    fallback: Option<Arc<FallbackFn>>,
}

impl FieldSpec {
    /// Declare a field with its internal name and type.
    pub fn new(internal_name: impl Into<String>, declared_type: TypeRef) -> Self {
        FieldSpec {
            internal_name: internal_name.into(),
            declared_type,
            config_key: None,
            default_literal: None,
            fallback: None,
        }
    }

    /// Set the source key expected in config trees.
    ///
    /// A field without a config key is excluded from config binding; it
    /// is either a task-only field filled through write accessors, or
    /// (if a fallback is set) served entirely by its fallback.
    pub fn with_config_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    /// Set a default-value literal, as JSON text.
    ///
    /// Defaults apply in Config mode only, and are decoded through the
    /// same codec path as bound values at bind time.
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default_literal = Some(literal.into());
        self
    }

    /// Set a fallback implementation, consulted by read dispatch when
    /// the field is absent from the Backing Store.
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&MaterializedTask) -> FieldValue + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// The internal name: the Backing Store key and task-mode tree key.
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// The declared type of this field.
    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    /// The source key expected in config trees, if any.
    pub fn config_key(&self) -> Option<&str> {
        self.config_key.as_deref()
    }

    /// The default-value literal, if any.
    pub fn default_literal(&self) -> Option<&str> {
        self.default_literal.as_deref()
    }

    /// The fallback implementation, if any.
    pub fn fallback(&self) -> Option<&Arc<FallbackFn>> {
        self.fallback.as_ref()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("internal_name", &self.internal_name)
            .field("declared_type", &self.declared_type)
            .field("config_key", &self.config_key)
            .field("default_literal", &self.default_literal)
            .field("fallback", &self.fallback.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// An immutable, named set of field declarations for one task type.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    name: String,
    fields: Vec<Arc<FieldSpec>>,
}

impl TaskDefinition {
    /// Start building a definition.
    pub fn builder(name: impl Into<String>) -> TaskDefinitionBuilder {
        TaskDefinitionBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// The definition's name, used in messages and task identity text.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All declared fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Arc<FieldSpec>> {
        self.fields.iter()
    }

    /// Look up a field by internal name.
    pub fn field(&self, internal_name: &str) -> Option<&Arc<FieldSpec>> {
        self.fields
            .iter()
            .find(|f| f.internal_name() == internal_name)
    }
}

/// Builder for [`TaskDefinition`].
#[derive(Debug)]
pub struct TaskDefinitionBuilder {
    name: String,
    fields: Vec<Arc<FieldSpec>>,
}

impl TaskDefinitionBuilder {
    /// Declare one field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(Arc::new(spec));
        self
    }

    /// Fold in every field of a parent definition, ahead of the fields
    /// declared on this builder. Covers supertype inheritance.
    pub fn extend(mut self, parent: &TaskDefinition) -> Self {
        let mut inherited: Vec<Arc<FieldSpec>> = parent.fields.clone();
        inherited.append(&mut self.fields);
        self.fields = inherited;
        self
    }

    /// Finish the definition.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DuplicateInternalName`] if two fields share an
    /// internal name. Sharing a config key is legal.
    pub fn build(self) -> Result<TaskDefinition, SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.internal_name().to_string()) {
                return Err(SchemaError::DuplicateInternalName {
                    definition: self.name,
                    name: field.internal_name().to_string(),
                });
            }
        }
        Ok(TaskDefinition {
            name: self.name,
            fields: self.fields,
        })
    }
}

/// The compiled mapping from source key to field descriptors.
///
/// Built once per definition and mode; read-only afterward and safe to
/// share across concurrent binds.
#[derive(Debug, Clone)]
pub struct TaskSchema {
    mode: BindingMode,
    groups: IndexMap<String, Vec<Arc<FieldSpec>>>,
}

impl TaskSchema {
    /// Compile a definition for the given binding mode.
    ///
    /// Config mode groups fields by their declared config key and drops
    /// fields without one. Task mode groups by internal name and drops
    /// only fallback-only fields (no config key, fallback set), which
    /// never bind in either direction.
    pub fn build(definition: &TaskDefinition, mode: BindingMode) -> Self {
        let mut groups: IndexMap<String, Vec<Arc<FieldSpec>>> = IndexMap::new();
        for field in definition.fields() {
            let key = match mode {
                BindingMode::Config => match field.config_key() {
                    Some(key) => key.to_string(),
                    None => continue,
                },
                BindingMode::Task => {
                    if field.config_key().is_none() && field.fallback().is_some() {
                        continue;
                    }
                    field.internal_name().to_string()
                },
            };
            groups.entry(key).or_default().push(Arc::clone(field));
        }
        TaskSchema { mode, groups }
    }

    /// The binding mode this schema was compiled for.
    pub fn mode(&self) -> BindingMode {
        self.mode
    }

    /// The field descriptors registered for a source key.
    pub fn get(&self, key: &str) -> Option<&[Arc<FieldSpec>]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Iterate all (source key, descriptors) groups in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<FieldSpec>])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The number of distinct source keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the schema binds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
