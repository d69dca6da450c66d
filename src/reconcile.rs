//! The Tree Reconciler: rebuilds a Canonical Tree from a foreign source.
//!
//! Two paths, tried in order:
//!
//! 1. If the source can serialize itself to text, parse that text and
//!    require an object root.
//! 2. Otherwise walk the foreign nodes one by one, classify each against
//!    the fixed kind table, and reassemble a local node of the same kind
//!    preserving order.
//!
//! Unsupported kinds (binary blobs, embedded objects) fail fast rather
//! than silently coercing; kinds that indicate a consistency bug in the
//! foreign object ("missing" markers, unclassifiable ancestries) are
//! reported as [`ReconcileError::Inconsistent`].

use tracing::debug;

use crate::error::ReconcileError;
use crate::foreign::{classify, ForeignNode, ForeignSource, ForeignValue, KindSpec};
use crate::tree::Node;

/// Rebuild a Canonical Tree from a foreign source.
///
/// The result root is always an object node.
///
/// # Errors
///
/// Any [`ReconcileError`] is fatal to the current operation: it means
/// the foreign object is incompatible or malformed, and retrying cannot
/// help.
pub fn reconcile(source: &dyn ForeignSource) -> Result<Node, ReconcileError> {
    if let Some(serialized) = source.to_json() {
        debug!("reconciling foreign source via serialize-to-text");
        let text = serialized.map_err(ReconcileError::SerializeFailed)?;
        return parse_serialized(&text);
    }

    if let Some(root) = source.root() {
        debug!("reconciling foreign source via per-kind node access");
        let node = rebuild(root)?;
        return match node {
            Node::Object(_) => Ok(node),
            other => Err(ReconcileError::RootNotObject { kind: other.kind() }),
        };
    }

    Err(ReconcileError::NoCapability)
}

/// Parse serialized foreign text, requiring an object root.
pub(crate) fn parse_serialized(text: &str) -> Result<Node, ReconcileError> {
    if text.trim().is_empty() {
        return Err(ReconcileError::NullPayload);
    }
    let node = Node::from_json_str(text).map_err(ReconcileError::BadJson)?;
    match node {
        Node::Object(_) => Ok(node),
        Node::Null => Err(ReconcileError::NullPayload),
        other => Err(ReconcileError::RootNotObject { kind: other.kind() }),
    }
}

/// Rebuild one foreign node into a local node, recursively.
pub(crate) fn rebuild(node: &dyn ForeignNode) -> Result<Node, ReconcileError> {
    let ancestry = node.ancestry();
    let spec = match classify(&ancestry) {
        Some(spec) => spec,
        None => {
            return Err(ReconcileError::Inconsistent {
                detail: format!("unknown foreign node kind: {}", ancestry.join(" < ")),
            });
        },
    };

    match spec {
        KindSpec::Null => Ok(Node::Null),
        KindSpec::Unsupported => Err(ReconcileError::UnsupportedKind {
            kind: ancestry.first().unwrap_or(&"?").to_string(),
        }),
        KindSpec::Missing => Err(ReconcileError::Inconsistent {
            detail: "a 'missing' marker node appeared inside a real tree".to_string(),
        }),
        KindSpec::Object => match fetch(node, spec)? {
            ForeignValue::Fields(fields) => {
                let mut entries = indexmap::IndexMap::with_capacity(fields.len());
                for (key, child) in fields {
                    entries.insert(key, rebuild(child)?);
                }
                Ok(Node::Object(entries))
            },
            _ => Err(wrong_payload(spec)),
        },
        KindSpec::Array => match fetch(node, spec)? {
            ForeignValue::Elements(elements) => {
                let mut rebuilt = Vec::with_capacity(elements.len());
                for child in elements {
                    rebuilt.push(rebuild(child)?);
                }
                Ok(Node::Array(rebuilt))
            },
            _ => Err(wrong_payload(spec)),
        },
        KindSpec::Text => match fetch(node, spec)? {
            ForeignValue::Text(s) => Ok(Node::Text(s)),
            _ => Err(wrong_payload(spec)),
        },
        KindSpec::Integer => match fetch(node, spec)? {
            ForeignValue::Long(i) => Ok(Node::Integer(i)),
            _ => Err(wrong_payload(spec)),
        },
        KindSpec::BigInteger => match fetch(node, spec)? {
            ForeignValue::BigInteger(literal) => match literal.parse::<i128>() {
                Ok(i) => Ok(Node::BigInteger(i)),
                // Past i128, keep the integer lossless as a decimal
                // literal instead of failing the whole tree.
                Err(_) => Node::decimal(literal.clone()).ok_or(ReconcileError::Inconsistent {
                    detail: format!("big-integer accessor returned a non-numeric literal: {literal}"),
                }),
            },
            _ => Err(wrong_payload(spec)),
        },
        KindSpec::Float => match fetch(node, spec)? {
            ForeignValue::Double(f) => Ok(Node::Float(f)),
            _ => Err(wrong_payload(spec)),
        },
        KindSpec::Decimal => match fetch(node, spec)? {
            ForeignValue::Decimal(literal) => {
                Node::decimal(literal.clone()).ok_or(ReconcileError::Inconsistent {
                    detail: format!("decimal accessor returned a non-numeric literal: {literal}"),
                })
            },
            _ => Err(wrong_payload(spec)),
        },
        KindSpec::Boolean => match fetch(node, spec)? {
            ForeignValue::Boolean(b) => Ok(Node::Boolean(b)),
            _ => Err(wrong_payload(spec)),
        },
    }
}

fn fetch<'a>(
    node: &'a dyn ForeignNode,
    spec: KindSpec,
) -> Result<ForeignValue<'a>, ReconcileError> {
    let accessor = spec.accessor_name().ok_or_else(|| ReconcileError::Inconsistent {
        detail: format!("kind {spec:?} has no accessor"),
    })?;
    node.accessor(accessor).ok_or(ReconcileError::MissingAccessor {
        kind: kind_name(spec),
        accessor,
    })
}

fn wrong_payload(spec: KindSpec) -> ReconcileError {
    ReconcileError::WrongPayload {
        kind: kind_name(spec),
        // accessor_name is Some for every kind that reaches here.
        accessor: spec.accessor_name().unwrap_or("?"),
    }
}

fn kind_name(spec: KindSpec) -> &'static str {
    match spec {
        KindSpec::Object => "object",
        KindSpec::Array => "array",
        KindSpec::Text => "text",
        KindSpec::Integer => "int",
        KindSpec::BigInteger => "big_integer",
        KindSpec::Float => "double",
        KindSpec::Decimal => "decimal",
        KindSpec::Boolean => "boolean",
        KindSpec::Null => "null",
        KindSpec::Unsupported => "unsupported",
        KindSpec::Missing => "missing",
    }
}
