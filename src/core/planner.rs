//! Planning policies: which step runs next.

use serde::{Deserialize, Serialize};

use crate::core::record::{Record, RecordKind};
use crate::core::state::CycleState;

/// Strategy choosing the next step name from the current state.
///
/// Policies are plain data. Anything a policy needs across restarts comes
/// out of [`CycleState`], so swapping or restoring a controller never loses
/// planning position. Reassigning the controller's planner takes effect on
/// the next advance and stays in effect until reassigned again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Planner {
    /// Always the same step. Assigning this policy is how a driver forces
    /// one specific step to run.
    Fixed { step: String },
    /// Walk `steps` cyclically, indexed by the completed-step count.
    Schedule { steps: Vec<String> },
    /// Choose by the newest record's kind. `on_start` covers the empty
    /// history and metadata records, both of which mean no experimental
    /// data has arrived since setup.
    ByLastKind {
        on_start: String,
        on_condition: String,
        on_observation: String,
        on_theory: String,
    },
}

impl Planner {
    /// Convenience constructor for the fixed policy.
    pub fn fixed(step: impl Into<String>) -> Self {
        Planner::Fixed { step: step.into() }
    }

    /// Name of the step to run next.
    ///
    /// Total over all states: an empty schedule plans an empty name, which
    /// no registry resolves, so the misconfiguration surfaces at dispatch.
    pub fn plan(&self, state: &CycleState) -> String {
        match self {
            Planner::Fixed { step } => step.clone(),
            Planner::Schedule { steps } => {
                if steps.is_empty() {
                    return String::new();
                }
                let slot = (state.steps_completed() % steps.len() as u64) as usize;
                steps[slot].clone()
            }
            Planner::ByLastKind {
                on_start,
                on_condition,
                on_observation,
                on_theory,
            } => {
                let newest = state.history().records().last().map(Record::kind);
                match newest {
                    None | Some(RecordKind::Metadata) => on_start.clone(),
                    Some(RecordKind::Condition) => on_condition.clone(),
                    Some(RecordKind::Observation) => on_observation.clone(),
                    Some(RecordKind::Theory) => on_theory.clone(),
                }
            }
        }
    }
}
