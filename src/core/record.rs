//! Record types carried through a cycle's history.
//!
//! These are deterministic data carriers: the controller moves them between
//! steps and storage without interpreting their contents.

use serde::{Deserialize, Serialize};

use crate::core::variable::VariableSet;

/// Kind tag carried by every history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Condition,
    Observation,
    Theory,
    Metadata,
}

impl RecordKind {
    /// All kinds, in a stable reporting order.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Condition,
        RecordKind::Observation,
        RecordKind::Theory,
        RecordKind::Metadata,
    ];

    /// Stable lowercase name used in logs and summaries.
    pub fn name(self) -> &'static str {
        match self {
            Self::Condition => "condition",
            Self::Observation => "observation",
            Self::Theory => "theory",
            Self::Metadata => "metadata",
        }
    }
}

/// Numeric table with named columns, the shape conditions and observations
/// travel in. One row per proposed or measured trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl DataTable {
    /// Empty table over the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<f64>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// A fitted theory: a display label plus an opaque serialized model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theory {
    pub label: String,
    /// Model bytes as produced by the fitting step; opaque to the
    /// controller.
    pub blob: Vec<u8>,
}

/// Payload carried by one history record.
///
/// The kind tag is derived from the variant, so a record can never carry a
/// tag that disagrees with its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Proposed experimental conditions.
    Conditions(DataTable),
    /// Collected observations, conditions plus measured outcomes.
    Observations(DataTable),
    /// A fitted theory.
    Theory(Theory),
    /// Variable metadata describing the experiment space.
    Metadata(VariableSet),
}

impl Payload {
    /// Kind tag for this payload.
    pub fn kind(&self) -> RecordKind {
        match self {
            Payload::Conditions(_) => RecordKind::Condition,
            Payload::Observations(_) => RecordKind::Observation,
            Payload::Theory(_) => RecordKind::Theory,
            Payload::Metadata(_) => RecordKind::Metadata,
        }
    }
}

/// One immutable unit of history: a payload plus the position it was
/// appended at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    index: u64,
    payload: Payload,
}

impl Record {
    pub(crate) fn new(index: u64, payload: Payload) -> Self {
        Self { index, payload }
    }

    /// Append position, assigned by the history and never reused.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Kind tag derived from the payload.
    pub fn kind(&self) -> RecordKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
