//! Experimental variable metadata: names, units, ranges, and value types.
//!
//! The controller stores and forwards this metadata without interpreting
//! it; step implementations and reporting consumers give it meaning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CycleError;

/// Value types a variable can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Real,
    Sigmoid,
    Probability,
    ProbabilitySample,
    ProbabilityDistribution,
    Class,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Real => "real",
            Self::Sigmoid => "sigmoid",
            Self::Probability => "probability",
            Self::ProbabilitySample => "probability_sample",
            Self::ProbabilityDistribution => "probability_distribution",
            Self::Class => "class",
        };
        f.write_str(name)
    }
}

/// One experimental variable: name, display label, units, range, value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    label: String,
    units: String,
    value_range: (f64, f64),
    value_type: ValueType,
}

impl Variable {
    /// Variable with default range `(0, 1)`, empty units, and
    /// [`ValueType::Real`]. The label defaults to the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            units: String::new(),
            value_range: (0.0, 1.0),
            value_type: ValueType::Real,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.value_range = (low, high);
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// Immutable collection of independent variables, dependent variables, and
/// covariates describing an experiment space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSet {
    independent: Vec<Variable>,
    dependent: Vec<Variable>,
    covariates: Vec<Variable>,
}

impl VariableSet {
    /// Build a variable set. All dependent variables must share one value
    /// type; mixing types is rejected up front rather than at fit time.
    pub fn new(
        independent: Vec<Variable>,
        dependent: Vec<Variable>,
        covariates: Vec<Variable>,
    ) -> Result<Self, CycleError> {
        if let Some(first) = dependent.first() {
            for variable in &dependent[1..] {
                if variable.value_type() != first.value_type() {
                    return Err(CycleError::MixedValueTypes {
                        first: first.value_type(),
                        second: variable.value_type(),
                    });
                }
            }
        }
        Ok(Self {
            independent,
            dependent,
            covariates,
        })
    }

    pub fn independent(&self) -> &[Variable] {
        &self.independent
    }

    pub fn dependent(&self) -> &[Variable] {
        &self.dependent
    }

    pub fn covariates(&self) -> &[Variable] {
        &self.covariates
    }

    /// All variables in declaration order: independent, dependent,
    /// covariates.
    pub fn all(&self) -> impl Iterator<Item = &Variable> {
        self.independent
            .iter()
            .chain(&self.dependent)
            .chain(&self.covariates)
    }

    /// Names of all variables in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.all().map(Variable::name)
    }

    /// Shared value type of the dependent variables, `None` when there are
    /// none.
    pub fn output_type(&self) -> Option<ValueType> {
        self.dependent.first().map(Variable::value_type)
    }

    /// Number of model inputs: independent variables plus covariates.
    pub fn input_dimensions(&self) -> usize {
        self.independent.len() + self.covariates.len()
    }

    /// Number of model outputs: dependent variables.
    pub fn output_dimensions(&self) -> usize {
        self.dependent.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ValueType, Variable, VariableSet};
    use crate::error::CycleError;

    #[test]
    fn label_defaults_to_name() {
        let variable = Variable::new("luminance");
        assert_eq!(variable.label(), "luminance");
        assert_eq!(variable.value_range(), (0.0, 1.0));
        assert_eq!(variable.value_type(), ValueType::Real);
    }

    #[test]
    fn builders_override_defaults() {
        let variable = Variable::new("rt")
            .with_label("response time")
            .with_units("ms")
            .with_range(0.0, 2000.0)
            .with_value_type(ValueType::Sigmoid);
        assert_eq!(variable.label(), "response time");
        assert_eq!(variable.units(), "ms");
        assert_eq!(variable.value_range(), (0.0, 2000.0));
        assert_eq!(variable.value_type(), ValueType::Sigmoid);
    }

    #[test]
    fn mixed_dependent_types_are_rejected() {
        let result = VariableSet::new(
            vec![Variable::new("x")],
            vec![
                Variable::new("y1").with_value_type(ValueType::Real),
                Variable::new("y2").with_value_type(ValueType::Probability),
            ],
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(CycleError::MixedValueTypes {
                first: ValueType::Real,
                second: ValueType::Probability,
            })
        ));
    }

    #[test]
    fn dimensions_count_inputs_and_outputs() {
        let variables = VariableSet::new(
            vec![Variable::new("x1"), Variable::new("x2")],
            vec![Variable::new("y")],
            vec![Variable::new("age")],
        )
        .expect("valid variable set");
        assert_eq!(variables.input_dimensions(), 3);
        assert_eq!(variables.output_dimensions(), 1);
        assert_eq!(variables.output_type(), Some(ValueType::Real));
        let names: Vec<&str> = variables.names().collect();
        assert_eq!(names, vec!["x1", "x2", "y", "age"]);
    }

    #[test]
    fn output_type_is_none_without_dependents() {
        let variables = VariableSet::new(vec![Variable::new("x")], Vec::new(), Vec::new())
            .expect("valid variable set");
        assert_eq!(variables.output_type(), None);
        assert_eq!(variables.output_dimensions(), 0);
    }
}
