//! Append-only log of cycle records with derived by-kind views.

use serde::{Deserialize, Serialize};

use crate::core::record::{Payload, Record, RecordKind};
use crate::core::variable::VariableSet;
use crate::error::CycleError;

/// Ordered, append-only history of everything a cycle has produced.
///
/// Insertion order encodes cycle progression. Records are never removed or
/// rewritten; sequence indices are assigned at append time and never
/// reused, which is what makes snapshot and restore safe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload, assigning the next sequence index. Returns the
    /// stored record.
    pub fn append(&mut self, payload: Payload) -> &Record {
        let index = self.records.len();
        self.records.push(Record::new(index as u64, payload));
        &self.records[index]
    }

    /// Newest record.
    pub fn last(&self) -> Result<&Record, CycleError> {
        self.records.last().ok_or(CycleError::EmptyHistory)
    }

    /// All records of one kind, oldest first.
    ///
    /// The view is computed on demand from the log, so it is always a
    /// fresh, restartable iterator and never goes stale.
    pub fn by_kind(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |record| record.kind() == kind)
    }

    /// Full log, oldest first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Completed cycles, counted as fitted theories.
    pub fn cycle_count(&self) -> usize {
        self.by_kind(RecordKind::Theory).count()
    }

    /// Newest variable metadata, if any metadata record was appended.
    pub fn variables(&self) -> Option<&VariableSet> {
        self.by_kind(RecordKind::Metadata)
            .last()
            .and_then(|record| match record.payload() {
                Payload::Metadata(variables) => Some(variables),
                _ => None,
            })
    }
}
