//! The foreign tree source contract: the portability boundary.
//!
//! A host process hands the engine a tree built by a different, possibly
//! version-incompatible implementation. The engine never assumes any
//! in-memory layout of that tree. Instead, embedding code wraps the
//! foreign representation in these capability traits, and the engine
//! talks to it through exactly two documented conventions:
//!
//! 1. **Fast path** — [`ForeignSource::to_json`]: the foreign object
//!    serializes itself to a JSON-compatible string in one call.
//! 2. **Fallback** — [`ForeignSource::root`]: older foreign runtimes
//!    expose their nodes one by one. Each node reports its type
//!    ancestry, and the engine resolves the node kind against the fixed
//!    [`KIND_TABLE`], then pulls the payload through the kind's
//!    documented accessor name.
//!
//! A source that offers neither capability cannot be reconciled at all.

/// An opaque tree-shaped value produced by a foreign runtime.
pub trait ForeignSource {
    /// Serialize the whole tree to JSON text, if the capability exists.
    ///
    /// Returns `None` when the foreign runtime predates the
    /// serialize-to-text operation; the reconciler then falls back to
    /// per-node access via [`root`](Self::root).
    fn to_json(&self) -> Option<Result<String, Box<dyn std::error::Error + Send + Sync>>>;

    /// Access the root node for per-kind fallback reconciliation.
    ///
    /// Returns `None` when per-node access is unavailable.
    fn root(&self) -> Option<&dyn ForeignNode>;
}

/// One node of a foreign tree, accessed by name convention only.
pub trait ForeignNode {
    /// The node's type ancestry, most-derived name first.
    ///
    /// The reconciler walks this list against [`KIND_TABLE`]; the first
    /// known kind name wins.
    fn ancestry(&self) -> Vec<&str>;

    /// Look up an accessor by its conventional name.
    ///
    /// Which name is asked for is dictated by the classified kind; see
    /// [`KIND_TABLE`]. Returns `None` if the node does not expose the
    /// accessor.
    fn accessor(&self, name: &str) -> Option<ForeignValue<'_>>;
}

/// A payload obtained from a foreign node accessor.
pub enum ForeignValue<'a> {
    /// Ordered key/child pairs of an object-kind node.
    Fields(Vec<(String, &'a dyn ForeignNode)>),
    /// Ordered children of an array-kind node.
    Elements(Vec<&'a dyn ForeignNode>),
    /// The value of a text-kind node.
    Text(String),
    /// The value of an integer-kind node.
    Long(i64),
    /// The value of a big-integer-kind node, as its decimal literal.
    BigInteger(String),
    /// The value of a float-kind node.
    Double(f64),
    /// The value of a decimal-kind node, as its exact literal.
    Decimal(String),
    /// The value of a boolean-kind node.
    Boolean(bool),
}

/// How a classified foreign node kind is rebuilt locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindSpec {
    /// Recurse over ordered fields.
    Object,
    /// Recurse over ordered elements.
    Array,
    /// Wrap a text value.
    Text,
    /// Wrap an integer value.
    Integer,
    /// Wrap a big-integer value.
    BigInteger,
    /// Wrap a float value.
    Float,
    /// Wrap a decimal value.
    Decimal,
    /// Wrap a boolean value.
    Boolean,
    /// A null node; no accessor involved.
    Null,
    /// A kind the engine refuses to coerce (binary blobs, embedded
    /// objects). Fails fast and explicitly.
    Unsupported,
    /// A kind that indicates a consistency bug in the foreign object
    /// (a "missing" marker inside a real tree). Fatal.
    Missing,
}

impl KindSpec {
    /// The conventional accessor name for this kind, if any.
    pub(crate) fn accessor_name(self) -> Option<&'static str> {
        match self {
            KindSpec::Object => Some("fields"),
            KindSpec::Array => Some("elements"),
            KindSpec::Text => Some("text_value"),
            KindSpec::Integer => Some("long_value"),
            KindSpec::BigInteger => Some("big_integer_value"),
            KindSpec::Float => Some("double_value"),
            KindSpec::Decimal => Some("decimal_value"),
            KindSpec::Boolean => Some("boolean_value"),
            KindSpec::Null | KindSpec::Unsupported | KindSpec::Missing => None,
        }
    }
}

/// The fixed table of known foreign node kind names.
///
/// Classification walks a node's ancestry against this table; nothing
/// else about the foreign type system is ever consulted.
pub(crate) const KIND_TABLE: &[(&str, KindSpec)] = &[
    ("object", KindSpec::Object),
    ("array", KindSpec::Array),
    ("text", KindSpec::Text),
    ("int", KindSpec::Integer),
    ("long", KindSpec::Integer),
    ("short", KindSpec::Integer),
    ("big_integer", KindSpec::BigInteger),
    ("float", KindSpec::Float),
    ("double", KindSpec::Float),
    ("decimal", KindSpec::Decimal),
    ("boolean", KindSpec::Boolean),
    ("null", KindSpec::Null),
    ("binary", KindSpec::Unsupported),
    ("embedded", KindSpec::Unsupported),
    ("missing", KindSpec::Missing),
];

/// Resolve a node's kind by walking its ancestry against the table.
pub(crate) fn classify(ancestry: &[&str]) -> Option<KindSpec> {
    for name in ancestry {
        for (kind_name, spec) in KIND_TABLE {
            if kind_name == name {
                return Some(*spec);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefers_most_derived_name() {
        // A subclassed text node still classifies as text through its
        // ancestry walk.
        assert_eq!(classify(&["fancy_text", "text"]), Some(KindSpec::Text));
        assert_eq!(classify(&["short"]), Some(KindSpec::Integer));
    }

    #[test]
    fn test_classify_unknown_ancestry() {
        assert_eq!(classify(&["widget", "gadget"]), None);
    }

    #[test]
    fn test_accessor_names_per_kind() {
        assert_eq!(KindSpec::Object.accessor_name(), Some("fields"));
        assert_eq!(KindSpec::Decimal.accessor_name(), Some("decimal_value"));
        assert_eq!(KindSpec::Null.accessor_name(), None);
    }
}
