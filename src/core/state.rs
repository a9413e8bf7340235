//! Persisted cycle state: the history plus resume bookkeeping.

use serde::{Deserialize, Serialize};

use crate::core::history::History;
use crate::core::record::{Payload, Record};

/// The controller's mutable, serializable state.
///
/// Steps see it read-only and communicate through returned payloads.
/// Everything a planning policy needs across restarts lives here rather
/// than in the policy value, so a restored snapshot continues exactly where
/// the dumped one stopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    history: History,
    steps_completed: u64,
    last_step: Option<String>,
}

impl CycleState {
    /// Empty state: no records, no steps completed.
    pub fn new() -> Self {
        Self::default()
    }

    /// State pre-populated with initial records, typically a metadata
    /// record carrying the variable set.
    pub fn seeded(payloads: Vec<Payload>) -> Self {
        let mut state = Self::new();
        for payload in payloads {
            state.history.append(payload);
        }
        state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Steps completed since the state was created. This is the schedule
    /// planner's cursor.
    pub fn steps_completed(&self) -> u64 {
        self.steps_completed
    }

    /// Name of the most recently completed step.
    pub fn last_step(&self) -> Option<&str> {
        self.last_step.as_deref()
    }

    /// Fold one completed step into the state: append its payloads in
    /// order, then advance the bookkeeping. This is the only mutation path.
    pub(crate) fn complete_step(&mut self, step: &str, payloads: Vec<Payload>) -> Vec<Record> {
        let mut appended = Vec::with_capacity(payloads.len());
        for payload in payloads {
            appended.push(self.history.append(payload).clone());
        }
        self.steps_completed += 1;
        self.last_step = Some(step.to_string());
        appended
    }
}
