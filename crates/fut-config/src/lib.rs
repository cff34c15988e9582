// crates/fut-config/src/lib.rs
// ============================================================================
// Module: FUT Config Library
// Description: Canonical config model and validation for the FUT harness.
// Purpose: Single source of truth for fut.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `fut-config` defines the configuration model for the FUT harness: how the
//! external validator is invoked, how wide the worker pool is, how long a run
//! may take, and where suites and reports live. Loading is strict and fails
//! closed on oversized, non-UTF-8, or out-of-range input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
