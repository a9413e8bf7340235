//! I/O for cycle persistence: state snapshots and controller descriptors.

pub mod descriptor;
pub mod snapshot;
