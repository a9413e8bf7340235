//! Test helpers: scripted steps and canned payloads.
//!
//! Available to unit tests and, behind the `test-support` feature, to
//! integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::record::{DataTable, Payload, Theory};
use crate::core::state::CycleState;
use crate::core::variable::{Variable, VariableSet};
use crate::registry::StepExecutor;

/// Step returning clones of the same payloads on every execution.
pub struct ConstStep {
    payloads: Vec<Payload>,
}

impl ConstStep {
    pub fn new(payloads: Vec<Payload>) -> Self {
        Self { payloads }
    }
}

impl StepExecutor for ConstStep {
    fn execute(&self, _state: &CycleState) -> Result<Vec<Payload>> {
        Ok(self.payloads.clone())
    }
}

/// Step replaying a queue of payload batches, one batch per execution.
/// Fails once the queue is exhausted.
pub struct ScriptedStep {
    batches: RefCell<VecDeque<Vec<Payload>>>,
}

impl ScriptedStep {
    pub fn new(batches: Vec<Vec<Payload>>) -> Self {
        Self {
            batches: RefCell::new(batches.into()),
        }
    }
}

impl StepExecutor for ScriptedStep {
    fn execute(&self, _state: &CycleState) -> Result<Vec<Payload>> {
        self.batches
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted step exhausted"))
    }
}

/// Step that always fails with the given message.
pub struct FailingStep {
    pub message: String,
}

impl StepExecutor for FailingStep {
    fn execute(&self, _state: &CycleState) -> Result<Vec<Payload>> {
        Err(anyhow!("{}", self.message))
    }
}

/// Single-row condition payload over column `x`.
pub fn condition(x: f64) -> Payload {
    Payload::Conditions(DataTable::new(vec!["x".to_string()]).with_row(vec![x]))
}

/// Single-row observation payload over columns `x`, `y`.
pub fn observation(x: f64, y: f64) -> Payload {
    Payload::Observations(
        DataTable::new(vec!["x".to_string(), "y".to_string()]).with_row(vec![x, y]),
    )
}

/// Theory payload with a label and opaque model bytes.
pub fn theory(label: &str, blob: Vec<u8>) -> Payload {
    Payload::Theory(Theory {
        label: label.to_string(),
        blob,
    })
}

/// Deterministic variable set: one independent variable, one dependent.
pub fn variables() -> VariableSet {
    VariableSet::new(
        vec![Variable::new("x").with_units("s").with_range(0.0, 10.0)],
        vec![Variable::new("y").with_units("mV")],
        Vec::new(),
    )
    .expect("valid variable set")
}
