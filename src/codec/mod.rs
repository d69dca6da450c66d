//! Value codecs: the bridge between tree nodes and typed field values.
//!
//! Every declared field type resolves to one [`Codec`] that can decode
//! a [`Node`] into a [`FieldValue`] and encode it back. The
//! [`CodecRegistry`] owns a fixed core set plus caller-supplied
//! extensions, is immutable after construction, and resolves
//! [`TypeRef`]s structurally: `Optional` unwraps to the inner codec,
//! `List`/`Map` wrap the element codec in a container codec, and
//! `Named` types resolve against registered extensions.

mod charset;
mod container;
mod scalar;
mod zone;

pub use charset::CharsetCodec;
pub use container::{ListCodec, MapCodec};
pub use scalar::{BooleanCodec, DecimalCodec, FloatCodec, IntegerCodec, JsonCodec, StringCodec};
pub use zone::ZoneIdCodec;

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;

use crate::schema::TypeRef;
use crate::tree::Node;
use crate::value::FieldValue;

/// Errors while encoding or decoding a field value.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The node or value had a kind the codec cannot handle.
    #[error("Expected a {expected} value, but got {actual}")]
    UnexpectedKind {
        /// What the codec expected.
        expected: &'static str,
        /// What it actually received.
        actual: &'static str,
    },

    /// The node had the right kind but an unusable content.
    #[error("Invalid {what}: {detail}")]
    Invalid {
        /// What was being decoded.
        what: &'static str,
        /// Why it was unusable.
        detail: String,
    },

    /// A default-value literal was not valid JSON text.
    #[error("Invalid default-value literal: {literal}")]
    BadLiteral {
        /// The literal as declared.
        literal: String,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// No codec is registered for the referenced type.
    #[error("No codec registered for type '{type_name}'")]
    Unregistered {
        /// The unresolvable type name.
        type_name: String,
    },
}

/// Encodes and decodes one declared field type.
pub trait Codec: Send + Sync {
    /// Decode a tree node into a typed field value.
    fn decode(&self, node: &Node) -> Result<FieldValue, CodecError>;

    /// Encode a typed field value back into a tree node.
    fn encode(&self, value: &FieldValue) -> Result<Node, CodecError>;
}

impl std::fmt::Debug for dyn Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Codec")
    }
}

/// The immutable set of codecs a facade was built with.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: IndexMap<String, Arc<dyn Codec>>,
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("types", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CodecRegistry {
    /// Start building a registry with the core codec set preinstalled.
    pub fn builder() -> CodecRegistryBuilder {
        let mut builder = CodecRegistryBuilder {
            codecs: IndexMap::new(),
        };
        builder.insert("boolean", Arc::new(BooleanCodec));
        builder.insert("integer", Arc::new(IntegerCodec));
        builder.insert("float", Arc::new(FloatCodec));
        builder.insert("decimal", Arc::new(DecimalCodec));
        builder.insert("string", Arc::new(StringCodec));
        builder.insert("json", Arc::new(JsonCodec));
        builder.insert("charset", Arc::new(CharsetCodec));
        builder.insert("zone_id", Arc::new(ZoneIdCodec::new()));
        builder
    }

    /// The core codec set with no extensions.
    pub fn with_default() -> Self {
        Self::builder().build()
    }

    /// Resolve the codec for a declared type, structurally.
    ///
    /// # Errors
    ///
    /// [`CodecError::Unregistered`] when a scalar or named type has no
    /// codec in this registry.
    pub fn lookup(&self, type_ref: &TypeRef) -> Result<Arc<dyn Codec>, CodecError> {
        match type_ref {
            TypeRef::Optional(inner) => self.lookup(inner),
            TypeRef::List(inner) => Ok(Arc::new(ListCodec::new(self.lookup(inner)?))),
            TypeRef::Map(inner) => Ok(Arc::new(MapCodec::new(self.lookup(inner)?))),
            scalar => {
                let name = type_key(scalar);
                self.codecs
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CodecError::Unregistered {
                        type_name: name.to_string(),
                    })
            },
        }
    }
}

fn type_key(type_ref: &TypeRef) -> &str {
    match type_ref {
        TypeRef::Boolean => "boolean",
        TypeRef::Integer => "integer",
        TypeRef::Float => "float",
        TypeRef::Decimal => "decimal",
        TypeRef::String => "string",
        TypeRef::Json => "json",
        TypeRef::Charset => "charset",
        TypeRef::ZoneId => "zone_id",
        TypeRef::Named(name) => name,
        // Wrappers are unwrapped before this point.
        TypeRef::Optional(_) | TypeRef::List(_) | TypeRef::Map(_) => "?",
    }
}

/// Builder for [`CodecRegistry`].
pub struct CodecRegistryBuilder {
    codecs: IndexMap<String, Arc<dyn Codec>>,
}

impl CodecRegistryBuilder {
    /// Register a codec under a type name, replacing any existing one.
    ///
    /// Registering over a name that already has a codec logs a warning,
    /// since it is usually an accidental duplicate.
    pub fn with_codec(mut self, name: impl Into<String>, codec: impl Codec + 'static) -> Self {
        self.insert_owned(name.into(), Arc::new(codec));
        self
    }

    fn insert(&mut self, name: &str, codec: Arc<dyn Codec>) {
        self.insert_owned(name.to_string(), codec);
    }

    fn insert_owned(&mut self, name: String, codec: Arc<dyn Codec>) {
        if self.codecs.contains_key(&name) {
            warn!(type_name = %name, "codec is already registered; it may be duplicated");
        }
        self.codecs.insert(name, codec);
    }

    /// Finish the registry.
    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            codecs: self.codecs,
        }
    }
}
