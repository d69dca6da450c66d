//! The Materialized Task: runtime accessor dispatch over a Backing Store.
//!
//! A task instance satisfies its definition's accessor contract without
//! any generated code: every read and write is dispatched against the
//! store by internal field name. Reads fall back to a field's declared
//! fallback implementation when the store has no entry; writes support
//! unsetting by writing `None`. The task can re-export itself as a
//! Canonical Tree any number of times, and identity is structural over
//! the store contents only.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::bind::BackingStore;
use crate::codec::CodecRegistry;
use crate::error::{Error, Result, ValidationError};
use crate::schema::TaskDefinition;
use crate::tree::Node;
use crate::validate::Validator;
use crate::value::FieldValue;

/// A runtime-constructed task bound from a Canonical Tree.
#[derive(Clone)]
pub struct MaterializedTask {
    definition: Arc<TaskDefinition>,
    store: BackingStore,
    codecs: Arc<CodecRegistry>,
    validator: Option<Arc<dyn Validator>>,
}

impl MaterializedTask {
    pub(crate) fn new(
        definition: Arc<TaskDefinition>,
        store: BackingStore,
        codecs: Arc<CodecRegistry>,
        validator: Option<Arc<dyn Validator>>,
    ) -> Self {
        MaterializedTask {
            definition,
            store,
            codecs,
            validator,
        }
    }

    /// The definition this task was built against.
    pub fn definition(&self) -> &Arc<TaskDefinition> {
        &self.definition
    }

    /// Read one field by internal name.
    ///
    /// Dispatch order: the Backing Store first, then the field's
    /// fallback implementation if one is declared. `Ok(None)` means the
    /// field is legitimately absent, which binding permits only for
    /// optional declared types.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAccessor`] if the definition has no such field.
    pub fn read(&self, accessor: &str) -> Result<Option<FieldValue>> {
        let spec = self
            .definition
            .field(accessor)
            .ok_or_else(|| Error::UnknownAccessor {
                definition: self.definition.name().to_string(),
                accessor: accessor.to_string(),
            })?;

        if let Some(value) = self.store.get(accessor) {
            return Ok(Some(value.clone()));
        }
        if let Some(fallback) = spec.fallback() {
            return Ok(Some(fallback(self)));
        }
        Ok(None)
    }

    /// Write one field by internal name; `None` unsets it.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAccessor`] if the definition has no such field.
    pub fn write(&mut self, accessor: &str, value: Option<FieldValue>) -> Result<()> {
        if self.definition.field(accessor).is_none() {
            return Err(Error::UnknownAccessor {
                definition: self.definition.name().to_string(),
                accessor: accessor.to_string(),
            });
        }
        match value {
            Some(value) => {
                self.store.insert(accessor.to_string(), value);
            },
            None => {
                self.store.shift_remove(accessor);
            },
        }
        Ok(())
    }

    /// Read a field that must be present and text-like.
    pub fn get_str(&self, accessor: &str) -> Result<String> {
        let value = self.require(accessor)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| kind_mismatch(accessor, "text", &value))
    }

    /// Read a field that must be present and an integer.
    pub fn get_i64(&self, accessor: &str) -> Result<i64> {
        let value = self.require(accessor)?;
        value
            .as_i64()
            .ok_or_else(|| kind_mismatch(accessor, "integer", &value))
    }

    /// Read a field that must be present and a boolean.
    pub fn get_bool(&self, accessor: &str) -> Result<bool> {
        let value = self.require(accessor)?;
        value
            .as_bool()
            .ok_or_else(|| kind_mismatch(accessor, "boolean", &value))
    }

    /// Read a field that must be present and a float.
    pub fn get_f64(&self, accessor: &str) -> Result<f64> {
        let value = self.require(accessor)?;
        value
            .as_f64()
            .ok_or_else(|| kind_mismatch(accessor, "float", &value))
    }

    /// Read an optional text-like field.
    pub fn get_opt_str(&self, accessor: &str) -> Result<Option<String>> {
        match self.read(accessor)? {
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| kind_mismatch(accessor, "text", &value)),
            None => Ok(None),
        }
    }

    fn require(&self, accessor: &str) -> Result<FieldValue> {
        self.read(accessor)?.ok_or_else(|| {
            Error::Bind(crate::error::BindError::MissingRequiredField {
                key: accessor.to_string(),
            })
        })
    }

    /// Snapshot the Backing Store into a fresh object tree.
    ///
    /// Entries are encoded through their field's codec, in insertion
    /// order. Optional fields absent from the store are appended as
    /// explicit nulls: a task-mode rebind requires every bound field to
    /// be present, so a dump must carry absence as `null` rather than
    /// omitting the key. Dumping is a pure read; it can be repeated any
    /// number of times with identical results.
    pub fn dump(&self) -> Result<Node> {
        let mut entries = indexmap::IndexMap::with_capacity(self.store.len());
        for (name, value) in &self.store {
            let spec = self
                .definition
                .field(name)
                .ok_or_else(|| Error::UnknownAccessor {
                    definition: self.definition.name().to_string(),
                    accessor: name.clone(),
                })?;
            let codec = self.codecs.lookup(spec.declared_type())?;
            entries.insert(name.clone(), codec.encode(value)?);
        }
        for spec in self.definition.fields() {
            // Fallback-only fields never bind in either direction and
            // stay out of the dump.
            let fallback_only = spec.config_key().is_none() && spec.fallback().is_some();
            if spec.declared_type().is_optional()
                && !fallback_only
                && !entries.contains_key(spec.internal_name())
            {
                entries.insert(spec.internal_name().to_string(), Node::Null);
            }
        }
        Ok(Node::Object(entries))
    }

    /// Run the configured validator, if any.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] aggregating every violation; the task itself
    /// is returned unchanged on success.
    pub fn validate(&self) -> Result<&Self, ValidationError> {
        if let Some(validator) = &self.validator {
            let violations = validator.validate(self);
            if !violations.is_empty() {
                return Err(ValidationError { violations });
            }
        }
        Ok(self)
    }

    /// The number of fields currently set.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no field is currently set.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

fn kind_mismatch(accessor: &str, expected: &'static str, value: &FieldValue) -> Error {
    Error::Bind(crate::error::BindError::Decode {
        key: accessor.to_string(),
        source: crate::codec::CodecError::UnexpectedKind {
            expected,
            actual: value.kind(),
        },
    })
}

impl PartialEq for MaterializedTask {
    /// Two tasks are equal iff their Backing Stores are equal,
    /// independent of identity, validator, or codec registry.
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
    }
}

impl Eq for MaterializedTask {}

impl Hash for MaterializedTask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use std::collections::hash_map::DefaultHasher;
        // Commutative over entries, consistent with IndexMap's
        // order-insensitive equality.
        let mut sum: u64 = 0;
        for (key, value) in &self.store {
            let mut entry_hasher = DefaultHasher::new();
            key.hash(&mut entry_hasher);
            value.hash(&mut entry_hasher);
            sum = sum.wrapping_add(entry_hasher.finish());
        }
        state.write_u64(sum);
    }
}

impl fmt::Debug for MaterializedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterializedTask")
            .field("definition", &self.definition.name())
            .field("store", &self.store)
            .finish()
    }
}

impl fmt::Display for MaterializedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.definition.name())?;
        for (i, (key, value)) in self.store.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, TypeRef};
    use crate::validate::{FnValidator, Violation};
    use pretty_assertions::assert_eq;

    fn definition() -> Arc<TaskDefinition> {
        Arc::new(
            TaskDefinition::builder("ExampleTask")
                .field(FieldSpec::new("Count", TypeRef::Integer).with_config_key("count"))
                .field(
                    FieldSpec::new("Note", TypeRef::String.optional()).with_config_key("note"),
                )
                .field(FieldSpec::new("Result", TypeRef::String))
                .field(FieldSpec::new("Label", TypeRef::String).with_fallback(|task| {
                    let count = task.get_i64("Count").unwrap_or(0);
                    FieldValue::Text(format!("task-{count}"))
                }))
                .build()
                .unwrap(),
        )
    }

    fn task_with(entries: &[(&str, FieldValue)]) -> MaterializedTask {
        let store: BackingStore = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        MaterializedTask::new(
            definition(),
            store,
            Arc::new(CodecRegistry::with_default()),
            None,
        )
    }

    #[test]
    fn test_read_prefers_store_over_fallback() {
        let task = task_with(&[
            ("Count", FieldValue::Integer(1)),
            ("Label", FieldValue::Text("explicit".to_string())),
        ]);
        assert_eq!(task.get_str("Label").unwrap(), "explicit");
    }

    #[test]
    fn test_read_falls_back_when_absent() {
        let task = task_with(&[("Count", FieldValue::Integer(7))]);
        assert_eq!(task.get_str("Label").unwrap(), "task-7");
    }

    #[test]
    fn test_read_absent_optional_is_none() {
        let task = task_with(&[("Count", FieldValue::Integer(1))]);
        assert_eq!(task.get_opt_str("Note").unwrap(), None);
    }

    #[test]
    fn test_unknown_accessor_is_an_error() {
        let task = task_with(&[]);
        assert!(matches!(
            task.read("Bogus"),
            Err(Error::UnknownAccessor { accessor, .. }) if accessor == "Bogus"
        ));
    }

    #[test]
    fn test_write_and_unset() {
        let mut task = task_with(&[("Count", FieldValue::Integer(1))]);
        task.write("Result", Some(FieldValue::Text("done".to_string())))
            .unwrap();
        assert_eq!(task.get_str("Result").unwrap(), "done");

        task.write("Result", None).unwrap();
        assert_eq!(task.read("Result").unwrap(), None);
    }

    #[test]
    fn test_dump_snapshots_in_insertion_order() {
        let mut task = task_with(&[("Count", FieldValue::Integer(3))]);
        task.write("Result", Some(FieldValue::Text("r".to_string())))
            .unwrap();
        let dumped = task.dump().unwrap();
        assert_eq!(
            dumped.to_json_string().unwrap(),
            "{\"Count\":3,\"Result\":\"r\",\"Note\":null}"
        );
    }

    #[test]
    fn test_dump_emits_null_for_absent_optional() {
        let task = task_with(&[("Count", FieldValue::Integer(3))]);
        let dumped = task.dump().unwrap();
        assert_eq!(dumped.as_object().unwrap()["Note"], Node::Null);
    }

    #[test]
    fn test_unset_optional_dumps_as_null() {
        let mut task = task_with(&[
            ("Count", FieldValue::Integer(3)),
            ("Note", FieldValue::Text("n".to_string())),
        ]);
        task.write("Note", None).unwrap();
        let dumped = task.dump().unwrap();
        assert_eq!(dumped.as_object().unwrap()["Note"], Node::Null);
    }

    #[test]
    fn test_dump_is_pure() {
        let task = task_with(&[("Count", FieldValue::Integer(3))]);
        assert_eq!(task.dump().unwrap(), task.dump().unwrap());
    }

    #[test]
    fn test_equality_is_structural_over_store_only() {
        let a = task_with(&[("Count", FieldValue::Integer(3))]);
        let b = task_with(&[("Count", FieldValue::Integer(3))]);
        let c = task_with(&[("Count", FieldValue::Integer(4))]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_shows_definition_and_store() {
        let task = task_with(&[("Count", FieldValue::Integer(3))]);
        assert_eq!(task.to_string(), "ExampleTask{Count: 3}");
    }

    #[test]
    fn test_validate_aggregates_violations() {
        let validator = FnValidator::new(|task: &MaterializedTask| {
            let mut violations = Vec::new();
            if task.get_i64("Count").map(|c| c < 0).unwrap_or(false) {
                violations.push(Violation {
                    path: "Count".to_string(),
                    message: "must not be negative".to_string(),
                    invalid_value: task
                        .read("Count")
                        .ok()
                        .flatten()
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                });
            }
            violations
        });
        let task = MaterializedTask::new(
            definition(),
            [("Count".to_string(), FieldValue::Integer(-5))]
                .into_iter()
                .collect(),
            Arc::new(CodecRegistry::with_default()),
            Some(Arc::new(validator)),
        );
        let err = task.validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_validate_without_validator_is_ok() {
        let task = task_with(&[("Count", FieldValue::Integer(1))]);
        assert!(task.validate().is_ok());
    }
}
