//! Step capability table: names mapped to executable step implementations.
//!
//! A step is the unit of work a cycle dispatches: propose conditions,
//! collect observations, fit a theory. The registry is a lookup table
//! rather than a type hierarchy, so the controller stays decoupled from
//! concrete implementations and tests can register scripted steps that
//! return predetermined payloads.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;

use crate::core::record::Payload;
use crate::core::state::CycleState;
use crate::error::CycleError;

/// Abstraction over step implementations.
pub trait StepExecutor {
    /// Run the step against a read-only view of the state, returning the
    /// payloads to append. Returning no payloads is legal for steps whose
    /// effects are external.
    fn execute(&self, state: &CycleState) -> Result<Vec<Payload>>;
}

/// Immutable name-to-step mapping, fixed at controller construction.
#[derive(Default)]
pub struct StepRegistry {
    steps: BTreeMap<String, Box<dyn StepExecutor>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step under `name`, consuming and returning the registry
    /// so construction reads as one expression. A repeated name replaces
    /// the earlier step.
    pub fn with_step(mut self, name: impl Into<String>, step: impl StepExecutor + 'static) -> Self {
        self.steps.insert(name.into(), Box::new(step));
        self
    }

    /// Register an already-boxed step. The descriptor path builds these.
    pub fn with_boxed_step(mut self, name: impl Into<String>, step: Box<dyn StepExecutor>) -> Self {
        self.steps.insert(name.into(), step);
        self
    }

    /// Look up a step by name.
    pub fn resolve(&self, step: &str) -> Result<&dyn StepExecutor, CycleError> {
        match self.steps.get(step) {
            Some(executor) => Ok(executor.as_ref()),
            None => Err(CycleError::UnknownStep {
                step: step.to_string(),
                registered: self.names().collect::<Vec<_>>().join(", "),
            }),
        }
    }

    /// Registered step names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    pub fn contains(&self, step: &str) -> bool {
        self.steps.contains_key(step)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
