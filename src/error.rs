//! Crate-wide error taxonomy for cycle execution and persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::variable::ValueType;

/// Canonical error type for the cycle controller.
///
/// Every failure surfaces to the immediate caller as a distinct kind; the
/// controller never retries and never degrades silently.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The planner produced a step name with no registered executor.
    #[error("unknown step '{step}' (registered: {registered})")]
    UnknownStep { step: String, registered: String },

    /// A step implementation returned an error.
    #[error("step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// A read required at least one record but the history is empty.
    #[error("history is empty")]
    EmptyHistory,

    /// No state snapshot exists at the expected path.
    #[error("no state snapshot at {}", .path.display())]
    StateNotFound { path: PathBuf },

    /// A snapshot exists but does not decode into a cycle state.
    #[error("corrupt state snapshot at {}: {}", .path.display(), .reason)]
    StateCorrupt { path: PathBuf, reason: String },

    /// A controller descriptor failed to parse, validate, or resolve.
    #[error("invalid descriptor: {reason}")]
    InvalidDescriptor { reason: String },

    /// Dependent variables declared with differing value types.
    #[error("dependent variables mix value types ({first} and {second})")]
    MixedValueTypes { first: ValueType, second: ValueType },

    /// Filesystem failure. The underlying error lives in the source chain,
    /// not the message.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl CycleError {
    /// Wrap an I/O error with a human-readable context string.
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
