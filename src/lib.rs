//! Resumable closed-loop empirical research cycles.
//!
//! A [`controller::Controller`] repeatedly advances an experimentation
//! cycle: a planning policy picks the next step by name, the step registry
//! dispatches it, and every result lands in an append-only history. State
//! can be dumped to disk between steps and loaded later, so long-running
//! cycles survive restarts and can span many process invocations.
//!
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (records, history, state,
//!   planning). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (state snapshots, controller
//!   descriptors).
//!
//! Orchestration ([`controller`], [`registry`]) ties core logic to the
//! step implementations registered by the embedding application.

pub mod controller;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod registry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
