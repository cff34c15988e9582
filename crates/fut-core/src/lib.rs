// crates/fut-core/src/lib.rs
// ============================================================================
// Module: FUT Core Library
// Description: Domain model, comparator, and collaborator contracts for FUT.
// Purpose: Single source of truth for test-case and report semantics.
// Dependencies: async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! `fut-core` defines the backend-agnostic pieces of the FUT conformance
//! harness: the declarative test-case model, the pure outcome comparator, the
//! interfaces implemented by readers, validator invokers, and report sinks,
//! and the aggregate [`Report`] handed to the reporting collaborator.
//!
//! The core performs no I/O and never reads wall-clock time; hosts supply
//! durations and timestamps when assembling reports.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;
pub use interfaces::*;
pub use runtime::comparator::compare;
