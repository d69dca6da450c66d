//! The Binding Facade: config and task mappers, and their factory.
//!
//! [`ConfigMapperFactory`] owns the codec registry and the optional
//! validator, both fixed at construction. From it, callers create a
//! [`ConfigMapper`] for inbound config binding (defaults allowed,
//! validation runs) and a [`TaskMapper`] for rebinding dumped task
//! trees (strict, no defaults, no validation). A factory and the
//! mappers it creates are immutable and safe to share across
//! concurrently executing binds; every bind produces its own Backing
//! Store.
//!
//! ```
//! use taskbind::{
//!     ConfigMapperFactory, FieldSpec, Node, TaskDefinition, TypeRef,
//! };
//! use std::sync::Arc;
//!
//! let definition = Arc::new(
//!     TaskDefinition::builder("PluginTask")
//!         .field(FieldSpec::new("Host", TypeRef::String).with_config_key("host"))
//!         .field(
//!             FieldSpec::new("Port", TypeRef::Integer)
//!                 .with_config_key("port")
//!                 .with_default("5432"),
//!         )
//!         .build()
//!         .unwrap(),
//! );
//!
//! let factory = ConfigMapperFactory::with_default();
//! let config = Node::from_json_str("{\"host\": \"db.example.com\"}").unwrap();
//! let task = factory
//!     .create_config_mapper()
//!     .map_node(&config, &definition)
//!     .unwrap();
//! assert_eq!(task.get_i64("Port").unwrap(), 5432);
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::bind::bind;
use crate::codec::{Codec, CodecRegistry, CodecRegistryBuilder};
use crate::error::{Error, Result, SchemaError};
use crate::foreign::ForeignSource;
use crate::reconcile::reconcile;
use crate::schema::{BindingMode, TaskDefinition, TaskSchema};
use crate::task::MaterializedTask;
use crate::validate::Validator;

/// Creates [`ConfigMapper`]s and [`TaskMapper`]s sharing one codec
/// registry and validator.
#[derive(Clone)]
pub struct ConfigMapperFactory {
    codecs: Arc<CodecRegistry>,
    validator: Option<Arc<dyn Validator>>,
}

impl std::fmt::Debug for ConfigMapperFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMapperFactory")
            .field("codecs", &self.codecs)
            .field("validator", &self.validator.as_ref().map(|_| "<validator>"))
            .finish()
    }
}

impl ConfigMapperFactory {
    /// Start building a factory with the core codec set.
    pub fn builder() -> ConfigMapperFactoryBuilder {
        ConfigMapperFactoryBuilder {
            codecs: CodecRegistry::builder(),
            validators: Vec::new(),
        }
    }

    /// A factory with the core codec set and no validator.
    pub fn with_default() -> Self {
        ConfigMapperFactory {
            codecs: Arc::new(CodecRegistry::with_default()),
            validator: None,
        }
    }

    /// Create a mapper for binding config trees.
    pub fn create_config_mapper(&self) -> ConfigMapper {
        ConfigMapper {
            codecs: Arc::clone(&self.codecs),
            validator: self.validator.clone(),
        }
    }

    /// Create a mapper for rebinding dumped task trees.
    pub fn create_task_mapper(&self) -> TaskMapper {
        TaskMapper {
            codecs: Arc::clone(&self.codecs),
        }
    }
}

/// Builder for [`ConfigMapperFactory`].
pub struct ConfigMapperFactoryBuilder {
    codecs: CodecRegistryBuilder,
    validators: Vec<Arc<dyn Validator>>,
}

impl ConfigMapperFactoryBuilder {
    /// Register an extension codec under a type name.
    pub fn with_codec(mut self, name: impl Into<String>, codec: impl Codec + 'static) -> Self {
        self.codecs = self.codecs.with_codec(name, codec);
        self
    }

    /// Set the validator run after every config bind.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Finish the factory.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ValidatorAlreadySet`] if more than one validator
    /// was supplied.
    pub fn build(self) -> Result<ConfigMapperFactory> {
        if self.validators.len() > 1 {
            return Err(Error::Schema(SchemaError::ValidatorAlreadySet));
        }
        Ok(ConfigMapperFactory {
            codecs: Arc::new(self.codecs.build()),
            validator: self.validators.into_iter().next(),
        })
    }
}

/// Maps config trees into Materialized Tasks.
///
/// Config mode: keys are declared source keys, default literals apply,
/// and the factory's validator (if any) runs on the bound task.
#[derive(Clone)]
pub struct ConfigMapper {
    codecs: Arc<CodecRegistry>,
    validator: Option<Arc<dyn Validator>>,
}

impl ConfigMapper {
    /// Reconcile a foreign source and bind it as a config tree.
    pub fn map(
        &self,
        source: &dyn ForeignSource,
        definition: &Arc<TaskDefinition>,
    ) -> Result<MaterializedTask> {
        let tree = reconcile(source)?;
        self.map_node(&tree, definition)
    }

    /// Bind an already-local config tree.
    pub fn map_node(
        &self,
        tree: &crate::tree::Node,
        definition: &Arc<TaskDefinition>,
    ) -> Result<MaterializedTask> {
        debug!(task = definition.name(), "binding config tree");
        let schema = TaskSchema::build(definition, BindingMode::Config);
        let store = bind(tree, &schema, &self.codecs)?;
        let task = MaterializedTask::new(
            Arc::clone(definition),
            store,
            Arc::clone(&self.codecs),
            self.validator.clone(),
        );
        task.validate()?;
        Ok(task)
    }
}

/// Maps dumped task trees back into Materialized Tasks.
///
/// Task mode: keys are internal names and every bound field must be
/// present. Task trees come from a prior dump, never hand-authored, so
/// there is no defaulting and no validation here.
#[derive(Clone)]
pub struct TaskMapper {
    codecs: Arc<CodecRegistry>,
}

impl TaskMapper {
    /// Reconcile a foreign source and bind it as a task tree.
    pub fn map(
        &self,
        source: &dyn ForeignSource,
        definition: &Arc<TaskDefinition>,
    ) -> Result<MaterializedTask> {
        let tree = reconcile(source)?;
        self.map_node(&tree, definition)
    }

    /// Bind an already-local task tree.
    pub fn map_node(
        &self,
        tree: &crate::tree::Node,
        definition: &Arc<TaskDefinition>,
    ) -> Result<MaterializedTask> {
        debug!(task = definition.name(), "binding task tree");
        let schema = TaskSchema::build(definition, BindingMode::Task);
        let store = bind(tree, &schema, &self.codecs)?;
        Ok(MaterializedTask::new(
            Arc::clone(definition),
            store,
            Arc::clone(&self.codecs),
            None,
        ))
    }
}
