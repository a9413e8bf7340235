//! Declarative controller descriptors.
//!
//! A descriptor is a TOML file naming a planning policy and a table of
//! steps, each bound to a registered implementation id plus free-form
//! params. Descriptors resolve against a [`StepCatalog`] of builders
//! supplied in code, so loading one can only ever instantiate
//! implementations the embedding application registered. Params from an
//! untrusted descriptor still reach the builders, which must treat them as
//! plain data.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::Controller;
use crate::core::planner::Planner;
use crate::error::CycleError;
use crate::registry::{StepExecutor, StepRegistry};

/// One step binding within a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Id of an implementation registered in the catalog.
    pub implementation: String,
    /// Free-form parameters handed to the implementation's builder.
    #[serde(default)]
    pub params: toml::Table,
}

/// Full declarative description of a controller: planner plus step table.
///
/// Planner-to-step references are deliberately not checked here; a planner
/// naming an unregistered step surfaces as an unknown-step error at
/// dispatch, the same as any other planning result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub planner: Planner,
    pub steps: BTreeMap<String, StepSpec>,
}

impl Descriptor {
    /// Structural validation: at least one step, non-blank names and
    /// implementation ids, non-empty schedules.
    pub fn validate(&self) -> Result<(), CycleError> {
        if self.steps.is_empty() {
            return Err(invalid("descriptor declares no steps"));
        }
        for (name, spec) in &self.steps {
            if name.trim().is_empty() {
                return Err(invalid("step names must not be blank"));
            }
            if spec.implementation.trim().is_empty() {
                return Err(invalid(format!("step '{name}' has a blank implementation id")));
            }
        }
        if let Planner::Schedule { steps } = &self.planner {
            if steps.is_empty() {
                return Err(invalid("schedule planner has no steps"));
            }
        }
        Ok(())
    }
}

/// Builder producing a step executor from its descriptor spec.
pub type StepBuilder = Box<dyn Fn(&StepSpec) -> anyhow::Result<Box<dyn StepExecutor>>>;

/// Fixed, trusted table of step implementations a descriptor may
/// reference.
#[derive(Default)]
pub struct StepCatalog {
    builders: BTreeMap<String, StepBuilder>,
}

impl StepCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder under an implementation id, consuming and
    /// returning the catalog so construction reads as one expression.
    pub fn with_builder<F>(mut self, implementation: impl Into<String>, builder: F) -> Self
    where
        F: Fn(&StepSpec) -> anyhow::Result<Box<dyn StepExecutor>> + 'static,
    {
        self.builders.insert(implementation.into(), Box::new(builder));
        self
    }

    /// Implementation ids in sorted order.
    pub fn implementations(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    fn build_step(&self, name: &str, spec: &StepSpec) -> Result<Box<dyn StepExecutor>, CycleError> {
        let builder = self.builders.get(&spec.implementation).ok_or_else(|| {
            invalid(format!(
                "step '{}' references unknown implementation '{}' (available: {})",
                name,
                spec.implementation,
                self.implementations().collect::<Vec<_>>().join(", ")
            ))
        })?;
        builder(spec).map_err(|err| invalid(format!("step '{name}' failed to build: {err:#}")))
    }
}

/// Parse and validate a descriptor file.
pub fn load_descriptor(path: &Path) -> Result<Descriptor, CycleError> {
    let contents = fs::read_to_string(path)
        .map_err(|err| CycleError::io(format!("read descriptor {}", path.display()), err))?;
    let descriptor: Descriptor = toml::from_str(&contents)
        .map_err(|err| invalid(format!("parse {}: {err}", path.display())))?;
    descriptor.validate()?;
    debug!(
        path = %path.display(),
        steps = descriptor.steps.len(),
        "descriptor loaded"
    );
    Ok(descriptor)
}

/// Serialize a descriptor to a TOML file.
pub fn write_descriptor(path: &Path, descriptor: &Descriptor) -> Result<(), CycleError> {
    descriptor.validate()?;
    let contents = toml::to_string_pretty(descriptor)
        .map_err(|err| invalid(format!("serialize descriptor: {err}")))?;
    fs::write(path, contents)
        .map_err(|err| CycleError::io(format!("write descriptor {}", path.display()), err))
}

/// Resolve a descriptor against a catalog, producing a controller over an
/// empty state.
pub fn build_controller(
    descriptor: &Descriptor,
    catalog: &StepCatalog,
) -> Result<Controller, CycleError> {
    descriptor.validate()?;
    let mut registry = StepRegistry::new();
    for (name, spec) in &descriptor.steps {
        registry = registry.with_boxed_step(name.clone(), catalog.build_step(name, spec)?);
    }
    Ok(Controller::new(registry, descriptor.planner.clone()))
}

/// Load a descriptor file and build its controller in one call.
pub fn load_controller(path: &Path, catalog: &StepCatalog) -> Result<Controller, CycleError> {
    let descriptor = load_descriptor(path)?;
    build_controller(&descriptor, catalog)
}

fn invalid(reason: impl Into<String>) -> CycleError {
    CycleError::InvalidDescriptor {
        reason: reason.into(),
    }
}
