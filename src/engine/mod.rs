// src/engine/mod.rs

//! Stack orchestration.
//!
//! - [`orchestrator`] resolves a stack's tasks, runs them sequentially or
//!   in parallel and threads responses between chained tasks.
//! - [`aggregate`] flattens the settled responses, classifies each entry and
//!   derives the stack outcome.

pub mod aggregate;
pub mod orchestrator;

pub use aggregate::{EntryClass, StackOutcome, StackReport, aggregate};
pub use orchestrator::{Orchestrator, PlannedTask, StackPhase};
