//! Error types for reconciliation, binding, and validation.
//!
//! The taxonomy mirrors the three failure classes of the engine:
//!
//! - [`ReconcileError`]: the foreign tree could not be rebuilt locally.
//!   Always fatal to the current operation; indicates an incompatible or
//!   malformed foreign object, never retried.
//! - [`BindError`]: the tree violated the task schema. User-facing
//!   configuration errors carrying the offending source key.
//! - [`ValidationError`]: constraint violations from a configured
//!   validator, aggregated into one message.
//!
//! Internal-consistency failures (duplicate-key accounting mismatches,
//! unknown node kinds) are carried as explicit `Internal`/`Inconsistent`
//! variants so they are distinguishable from user errors.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;
use crate::validate::Violation;

/// Result type alias using the library's [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Umbrella error type covering every failure of the engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Rebuilding a local tree from a foreign source failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Binding a tree against a task schema failed.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// A configured validator reported constraint violations.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A task definition or factory was constructed inconsistently.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Encoding or decoding a field value failed outside of binding.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An accessor name does not exist in the task definition.
    #[error("Task '{definition}' has no accessor named '{accessor}'")]
    UnknownAccessor {
        /// The task definition that was asked.
        definition: String,
        /// The accessor name that was not found.
        accessor: String,
    },
}

/// Errors while rebuilding a Canonical Tree from a foreign source.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The foreign source offers neither serialization nor node access.
    #[error("Foreign source supports neither serialize-to-text nor per-kind node access")]
    NoCapability,

    /// The foreign source's serialize-to-text operation itself failed.
    #[error("Foreign source failed to serialize itself to text")]
    SerializeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The serialized text was not valid JSON.
    #[error("Foreign source returned an invalid JSON text")]
    BadJson(#[source] serde_json::Error),

    /// The serialized text was empty or parsed to `null`.
    #[error("Foreign source returned a null or empty payload")]
    NullPayload,

    /// The root of the foreign tree is not an object.
    #[error("Foreign tree root is not an object, but {kind}")]
    RootNotObject {
        /// The kind of the actual root node.
        kind: &'static str,
    },

    /// The foreign node is of a kind the engine refuses to coerce.
    #[error("Foreign node kind '{kind}' is not supported")]
    UnsupportedKind {
        /// The offending kind name.
        kind: String,
    },

    /// The foreign node lacks the accessor its kind is documented to have.
    #[error("Foreign node of kind '{kind}' does not expose accessor '{accessor}'")]
    MissingAccessor {
        /// The classified kind of the node.
        kind: &'static str,
        /// The accessor name that was expected.
        accessor: &'static str,
    },

    /// An accessor returned a payload of an unexpected shape.
    #[error("Foreign node accessor '{accessor}' on kind '{kind}' returned an unexpected payload")]
    WrongPayload {
        /// The classified kind of the node.
        kind: &'static str,
        /// The accessor that misbehaved.
        accessor: &'static str,
    },

    /// The foreign tree is in a state that indicates a defect, not bad input.
    #[error("Inconsistent foreign tree: {detail}")]
    Inconsistent {
        /// What exactly was inconsistent.
        detail: String,
    },
}

/// A single disallowed-null occurrence recorded during one bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullViolation {
    /// The source key whose value was null.
    pub key: String,
    /// The accessor (internal name) of the rejecting field.
    pub accessor: String,
}

impl fmt::Display for NullViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Setting null to field '{}' is not allowed: {} has to declare an optional type to represent null",
            self.key, self.accessor
        )
    }
}

/// Errors while binding a Canonical Tree against a task schema.
#[derive(Error, Debug)]
pub enum BindError {
    /// The root of the tree to bind is not an object.
    #[error("Expected a tree with an object root, but got {kind}")]
    RootNotObject {
        /// The kind of the actual root node.
        kind: &'static str,
    },

    /// A required field is present in the schema but absent from the tree.
    #[error("Field '{key}' is required but not set")]
    MissingRequiredField {
        /// The source key of the missing field.
        key: String,
    },

    /// One or more null values were given for non-optional fields.
    ///
    /// All null-policy violations found in one bind are collected here
    /// rather than failing on the first one.
    #[error("Setting null to a task field is not allowed: {}", format_null_violations(.violations))]
    NullNotAllowed {
        /// Every disallowed null found during the bind, in tree order.
        violations: Vec<NullViolation>,
    },

    /// Decoding a value for a field failed.
    #[error("Failed to decode the value of field '{key}'")]
    Decode {
        /// The source key of the undecodable field.
        key: String,
        /// The underlying codec failure.
        #[source]
        source: CodecError,
    },

    /// A bookkeeping invariant of the binding engine itself broke.
    ///
    /// This is a defect in the engine or the schema construction, not a
    /// configuration error in the bound tree.
    #[error("FATAL: expected to be a bug in taskbind: {detail}")]
    Internal {
        /// Details of the broken invariant.
        detail: String,
    },
}

fn format_null_violations(violations: &[NullViolation]) -> String {
    let parts: Vec<String> = violations.iter().map(ToString::to_string).collect();
    parts.join("; ")
}

/// Aggregated constraint violations from one `validate()` call.
#[derive(Error, Debug)]
#[error("Task validation failed: {}", format_violations(.violations))]
pub struct ValidationError {
    /// Every violation reported by the validator.
    pub violations: Vec<Violation>,
}

fn format_violations(violations: &[Violation]) -> String {
    let parts: Vec<String> = violations
        .iter()
        .map(|v| format!("[{}] {} (got: {})", v.path, v.message, v.invalid_value))
        .collect();
    parts.join("; ")
}

/// Errors while constructing task definitions or mapper factories.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Two fields of one definition share an internal name.
    #[error("Task definition '{definition}' declares field '{name}' more than once")]
    DuplicateInternalName {
        /// The definition under construction.
        definition: String,
        /// The duplicated internal name.
        name: String,
    },

    /// A validator was supplied to a factory builder more than once.
    #[error("ConfigMapperFactory accepts with_validator just once")]
    ValidatorAlreadySet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_violations_aggregate_in_message() {
        let err = BindError::NullNotAllowed {
            violations: vec![
                NullViolation {
                    key: "host".to_string(),
                    accessor: "Host".to_string(),
                },
                NullViolation {
                    key: "port".to_string(),
                    accessor: "Port".to_string(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("'host'"));
        assert!(message.contains("'port'"));
    }

    #[test]
    fn test_missing_required_field_cites_key() {
        let err = BindError::MissingRequiredField {
            key: "name".to_string(),
        };
        assert_eq!(err.to_string(), "Field 'name' is required but not set");
    }

    #[test]
    fn test_validation_error_lists_every_violation() {
        let err = ValidationError {
            violations: vec![
                Violation {
                    path: "count".to_string(),
                    message: "must be positive".to_string(),
                    invalid_value: "-1".to_string(),
                },
                Violation {
                    path: "name".to_string(),
                    message: "must not be empty".to_string(),
                    invalid_value: "\"\"".to_string(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("[count] must be positive"));
        assert!(message.contains("[name] must not be empty"));
    }
}
