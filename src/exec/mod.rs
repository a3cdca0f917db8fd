// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] owns retry, blocking/non-blocking settlement and the
//!   pre-flight availability check.
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `TokioProcessBackend`; tests swap in a scripted fake.
//! - [`probe`] looks programs up on the host search path.

pub mod backend;
pub mod probe;
pub mod runner;

pub use backend::{ExitReport, Invocation, InvocationMode, ProcessBackend, TokioProcessBackend};
pub use runner::{CommandOutcome, CommandRequest, CommandRunner, ExecOptions};
