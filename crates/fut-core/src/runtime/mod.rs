// crates/fut-core/src/runtime/mod.rs
// ============================================================================
// Module: FUT Runtime Logic
// Description: Pure evaluation logic shared by FUT runners.
// Purpose: Host the outcome comparator.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Runtime logic here is pure and deterministic; scheduling and process
//! management live in `fut-runner`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod comparator;
