// crates/fut-core/src/core/mod.rs
// ============================================================================
// Module: FUT Core Types
// Description: Identifiers, test-case model, discrepancies, and reports.
// Purpose: Group the data types shared by every FUT crate.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are plain data. They are immutable once constructed by a
//! reader and carry no behavior beyond small accessors and rendering.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod discrepancy;
pub mod identifiers;
pub mod model;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use discrepancy::Discrepancy;
pub use discrepancy::OutcomeCategory;
pub use identifiers::TestCaseId;
pub use model::ExpectedResult;
pub use model::ExpectedStatus;
pub use model::Invariant;
pub use model::TestCase;
pub use model::ValidationContext;
pub use report::CaseOutcome;
pub use report::LoadFailure;
pub use report::Report;
pub use report::ReportInputs;
pub use report::TestReport;
pub use report::TestStatus;
