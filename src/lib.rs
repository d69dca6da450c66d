//! # taskbind
//!
//! A schema-driven configuration/task binding engine. It converts an
//! untyped, tree-shaped external data source into a strongly-typed,
//! schema-validated in-memory task object, and converts that typed
//! object back into the same tree shape — letting independently-built
//! components (a host process and a plugin it loads) exchange
//! structured configuration and execution state without sharing a
//! concrete data-tree implementation.
//!
//! ## Pipeline
//!
//! Inbound: foreign source → [`reconcile`] → [`Node`] tree →
//! [`ConfigMapper`]/[`TaskMapper`] (guided by the [`TaskDefinition`]'s
//! compiled [`TaskSchema`]) → [`MaterializedTask`]. Outbound:
//! [`MaterializedTask::dump`] → [`Node`] → JSON text.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use taskbind::{ConfigMapperFactory, FieldSpec, Node, TaskDefinition, TypeRef};
//!
//! let definition = Arc::new(
//!     TaskDefinition::builder("PluginTask")
//!         .field(FieldSpec::new("Count", TypeRef::Integer).with_config_key("count"))
//!         .field(FieldSpec::new("Name", TypeRef::String).with_config_key("name"))
//!         .field(
//!             FieldSpec::new("Note", TypeRef::String)
//!                 .with_config_key("note")
//!                 .with_default("\"z\""),
//!         )
//!         .build()
//!         .unwrap(),
//! );
//!
//! let factory = ConfigMapperFactory::with_default();
//! let config = Node::from_json_str("{\"count\": 3, \"name\": \"x\"}").unwrap();
//!
//! let task = factory
//!     .create_config_mapper()
//!     .map_node(&config, &definition)
//!     .unwrap();
//! assert_eq!(task.get_i64("Count").unwrap(), 3);
//! assert_eq!(task.get_str("Note").unwrap(), "z");
//!
//! // Dump and rebind: task trees are complete and strict.
//! let dumped = task.dump().unwrap();
//! let rebound = factory
//!     .create_task_mapper()
//!     .map_node(&dumped, &definition)
//!     .unwrap();
//! assert_eq!(task, rebound);
//! ```
//!
//! ## Binding modes
//!
//! Config mode binds declared source keys and applies default literals.
//! Task mode binds internal names, never defaults, and expects every
//! field present — task trees come from a prior dump, not from hands.
//! One source key may drive several differently-typed fields (field
//! duplication), which is load-bearing for compatibility scenarios.
//!
//! ## Concurrency
//!
//! The engine is synchronous and thread-agnostic. Factories, mappers,
//! definitions, schemas, and codec registries are immutable after
//! construction and freely shareable; each bind produces its own
//! Backing Store, owned exclusively by one [`MaterializedTask`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bind;
pub mod codec;
pub mod error;
pub mod foreign;
pub mod mapper;
pub mod reconcile;
pub mod schema;
pub mod task;
pub mod tree;
pub mod validate;
pub mod value;

#[cfg(test)]
mod testutil;

pub use bind::{bind, BackingStore};
pub use codec::{Codec, CodecError, CodecRegistry, CodecRegistryBuilder};
pub use error::{BindError, Error, NullViolation, ReconcileError, Result, SchemaError, ValidationError};
pub use foreign::{ForeignNode, ForeignSource, ForeignValue};
pub use mapper::{ConfigMapper, ConfigMapperFactory, ConfigMapperFactoryBuilder, TaskMapper};
pub use reconcile::reconcile;
pub use schema::{BindingMode, FieldSpec, TaskDefinition, TaskDefinitionBuilder, TaskSchema, TypeRef};
pub use task::MaterializedTask;
pub use tree::Node;
pub use validate::{FnValidator, Validator, Violation};
pub use value::FieldValue;
