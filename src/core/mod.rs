//! Deterministic, pure logic for cycle execution.
//!
//! Core modules must be free of I/O side effects. They operate on
//! in-memory data structures and return deterministic outputs suitable for
//! direct unit testing.

pub mod history;
pub mod planner;
pub mod record;
pub mod state;
pub mod variable;
