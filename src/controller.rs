//! Orchestration of cycle steps: plan, dispatch, record.

use std::path::Path;

use tracing::{debug, info};

use crate::core::planner::Planner;
use crate::core::record::Record;
use crate::core::state::CycleState;
use crate::error::CycleError;
use crate::io::snapshot;
use crate::registry::StepRegistry;

/// Result of one advance: the step that ran and the records it appended.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: String,
    /// Records appended by the step, in append order. Empty when the step
    /// produced no payloads.
    pub records: Vec<Record>,
}

/// Resumable cycle state machine.
///
/// Each [`advance`](Controller::advance) performs exactly one planner
/// decision and one registry dispatch, then folds the step's payloads into
/// the history. Between advances the state can be dumped to a directory
/// and later loaded into a fresh controller, which continues exactly where
/// the dumped one stopped. Single-threaded: callers sequence all advances
/// on one controller.
#[derive(Debug)]
pub struct Controller {
    /// Planning policy. Reassignment takes effect on the next advance and
    /// stays in effect until reassigned again.
    pub planner: Planner,
    registry: StepRegistry,
    state: CycleState,
}

impl Controller {
    /// Controller over an empty state.
    pub fn new(registry: StepRegistry, planner: Planner) -> Self {
        Self::with_state(registry, planner, CycleState::new())
    }

    /// Controller resuming from an existing state, such as a loaded
    /// snapshot or a seeded one.
    pub fn with_state(registry: StepRegistry, planner: Planner, state: CycleState) -> Self {
        Self {
            planner,
            registry,
            state,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &CycleState {
        &self.state
    }

    /// The step table this controller dispatches against.
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Run exactly one step: plan, resolve, execute, record.
    ///
    /// All-or-nothing: if planning, resolution, or execution fails, neither
    /// the history nor the bookkeeping changes.
    pub fn advance(&mut self) -> Result<StepOutcome, CycleError> {
        let step = self.planner.plan(&self.state);
        debug!(step = %step, "planned next step");

        let executor = self.registry.resolve(&step)?;
        let payloads = executor
            .execute(&self.state)
            .map_err(|err| CycleError::StepFailed {
                step: step.clone(),
                message: format!("{err:#}"),
            })?;

        let records = self.state.complete_step(&step, payloads);
        info!(
            step = %step,
            records = records.len(),
            history_len = self.state.history().len(),
            "step complete"
        );
        Ok(StepOutcome { step, records })
    }

    /// Replace the state with the snapshot stored in `directory`.
    ///
    /// On failure the current state is retained unchanged.
    pub fn load(&mut self, directory: &Path) -> Result<(), CycleError> {
        self.state = snapshot::load_state(directory)?;
        debug!(
            directory = %directory.display(),
            history_len = self.state.history().len(),
            "state loaded"
        );
        Ok(())
    }

    /// Persist the current state to `directory`, atomically replacing any
    /// prior snapshot.
    pub fn dump(&self, directory: &Path) -> Result<(), CycleError> {
        snapshot::dump_state(directory, &self.state)?;
        debug!(
            directory = %directory.display(),
            history_len = self.state.history().len(),
            "state dumped"
        );
        Ok(())
    }
}
