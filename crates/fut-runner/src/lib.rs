// crates/fut-runner/src/lib.rs
// ============================================================================
// Module: FUT Runner Library
// Description: Validator invocation and concurrent test orchestration.
// Purpose: Execute loaded test cases against the external validator.
// Dependencies: fut-core, tokio, tracing
// ============================================================================

//! ## Overview
//! `fut-runner` owns the parts of the harness that touch processes and
//! concurrency. [`ProcessValidator`] runs the external validator for one test
//! case with a hard timeout; [`Orchestrator`] schedules every loaded test case
//! on a bounded pool, compares outcomes, and hands the aggregate report to a
//! sink exactly once.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod invoker;
pub mod orchestrator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use invoker::ProcessValidator;
pub use invoker::ValidatorCommand;
pub use orchestrator::Orchestrator;
pub use orchestrator::RunOptions;
