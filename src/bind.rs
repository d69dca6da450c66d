//! The Binding Engine: one pass from a Canonical Tree to a Backing Store.
//!
//! Binding walks the tree root's key/value pairs once, in tree order.
//! Every key known to the schema is decoded through the declared type's
//! codec and stored under each field descriptor registered for that key;
//! unrecognized keys are skipped for forward compatibility. After the
//! walk, Config mode fills unsatisfied fields from their default
//! literals; anything still unsatisfied is a missing required field.
//!
//! Null-policy violations are collected across the whole bind and
//! reported together, so a user fixing a config sees every offending
//! key at once.

use indexmap::IndexMap;
use tracing::debug;

use crate::codec::{CodecError, CodecRegistry};
use crate::error::{BindError, NullViolation};
use crate::schema::{BindingMode, FieldSpec, TaskSchema};
use crate::tree::Node;
use crate::value::FieldValue;

use std::sync::Arc;

/// The decoded field values backing one Materialized Task.
///
/// Keyed by internal field name, in insertion order. Owned exclusively
/// by one task instance; the engine performs no synchronization on it.
pub type BackingStore = IndexMap<String, FieldValue>;

/// Bind a Canonical Tree against a compiled schema.
///
/// The binding mode is the one the schema was compiled for. On failure
/// the schema and codec registry are untouched; every [`BindError`] is
/// recoverable by fixing the input tree.
pub fn bind(
    tree: &Node,
    schema: &TaskSchema,
    codecs: &CodecRegistry,
) -> Result<BackingStore, BindError> {
    let entries = match tree {
        Node::Object(entries) => entries,
        other => return Err(BindError::RootNotObject { kind: other.kind() }),
    };

    // Every (descriptor, key) pair may be consumed at most once; this
    // map tracks which descriptors are still waiting for their key.
    let mut unfilled: IndexMap<&str, (&Arc<FieldSpec>, &str)> = IndexMap::new();
    for (key, specs) in schema.iter() {
        for spec in specs {
            unfilled.insert(spec.internal_name(), (spec, key));
        }
    }

    let mut store = BackingStore::new();
    let mut null_violations: Vec<NullViolation> = Vec::new();

    for (key, value) in entries {
        let Some(specs) = schema.get(key) else {
            debug!(key = %key, "skipping a key not in the schema");
            continue;
        };

        for spec in specs {
            decode_into(
                key,
                value,
                spec,
                codecs,
                &mut store,
                &mut null_violations,
            )?;

            match unfilled.shift_remove(spec.internal_name()) {
                Some((_, expected_key)) if expected_key == key.as_str() => {},
                _ => {
                    return Err(BindError::Internal {
                        detail: format!(
                            "mapping \"{}: {}\" has already been processed or is not in the schema",
                            key,
                            spec.internal_name(),
                        ),
                    });
                },
            }
        }
    }

    // Fill defaults, or fail on required fields. Defaults work only in
    // Config mode; task trees come from a prior dump and are expected
    // to be complete.
    for (_, (spec, key)) in unfilled {
        let default = match schema.mode() {
            BindingMode::Config => spec.default_literal(),
            BindingMode::Task => None,
        };
        match default {
            Some(literal) => {
                let node =
                    Node::from_json_str(literal).map_err(|source| BindError::Decode {
                        key: key.to_string(),
                        source: CodecError::BadLiteral {
                            literal: literal.to_string(),
                            source,
                        },
                    })?;
                decode_into(key, &node, spec, codecs, &mut store, &mut null_violations)?;
            },
            None => {
                return Err(BindError::MissingRequiredField {
                    key: key.to_string(),
                });
            },
        }
    }

    if !null_violations.is_empty() {
        return Err(BindError::NullNotAllowed {
            violations: null_violations,
        });
    }

    Ok(store)
}

/// Decode one value for one descriptor, honoring the null policy.
fn decode_into(
    key: &str,
    value: &Node,
    spec: &FieldSpec,
    codecs: &CodecRegistry,
    store: &mut BackingStore,
    null_violations: &mut Vec<NullViolation>,
) -> Result<(), BindError> {
    if value.is_null() {
        if spec.declared_type().is_optional() {
            // Optional null means absent; nothing lands in the store.
            return Ok(());
        }
        null_violations.push(NullViolation {
            key: key.to_string(),
            accessor: spec.internal_name().to_string(),
        });
        return Ok(());
    }

    let codec = codecs
        .lookup(spec.declared_type())
        .map_err(|source| BindError::Decode {
            key: key.to_string(),
            source,
        })?;
    let decoded = codec.decode(value).map_err(|source| BindError::Decode {
        key: key.to_string(),
        source,
    })?;
    store.insert(spec.internal_name().to_string(), decoded);
    Ok(())
}
