//! The pluggable validator contract.
//!
//! The engine does not know any constraint rules of its own. A caller
//! supplies a [`Validator`] at facade construction time; the engine
//! runs it after every config bind and whenever
//! [`MaterializedTask::validate`](crate::task::MaterializedTask::validate)
//! is called, aggregating all violations into one error.

use crate::task::MaterializedTask;

/// One constraint violation reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where the violation occurred (field path).
    pub path: String,
    /// What constraint was violated.
    pub message: String,
    /// The offending value, rendered as text.
    pub invalid_value: String,
}

/// Validates a Materialized Task against caller-defined constraints.
pub trait Validator: Send + Sync {
    /// Check the task; an empty list means it is valid.
    fn validate(&self, task: &MaterializedTask) -> Vec<Violation>;
}

/// A [`Validator`] backed by a plain function or closure.
pub struct FnValidator<F> {
    check: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&MaterializedTask) -> Vec<Violation> + Send + Sync,
{
    /// Wrap a function as a validator.
    pub fn new(check: F) -> Self {
        FnValidator { check }
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&MaterializedTask) -> Vec<Violation> + Send + Sync,
{
    fn validate(&self, task: &MaterializedTask) -> Vec<Violation> {
        (self.check)(task)
    }
}
