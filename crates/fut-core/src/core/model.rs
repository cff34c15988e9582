// crates/fut-core/src/core/model.rs
// ============================================================================
// Module: FUT Test Case Model
// Description: In-memory model of declarative validator test cases.
// Purpose: Describe what to validate, in which context, and what to expect.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`TestCase`] pairs one input artifact with the validation context passed
//! to the external validator and the [`ExpectedResult`] its output must match.
//! Test cases are owned by the orchestrator for the duration of a run and are
//! never mutated after loading.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::identifiers::TestCaseId;

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// One declarative validator scenario.
///
/// # Invariants
/// - `instance_path` is already resolved against the description file directory.
/// - Values are snapshots; consumers must not mutate them during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Unique identifier within one invocation.
    pub id: TestCaseId,
    /// Human description (empty when not declared).
    pub description: String,
    /// Path to the input artifact handed to the validator.
    pub instance_path: PathBuf,
    /// Validator parameters for this case.
    pub context: ValidationContext,
    /// Expected validator outcome.
    pub expected: ExpectedResult,
}

// ============================================================================
// SECTION: Validation Context
// ============================================================================

/// Validator parameters for a single test case.
///
/// # Invariants
/// - Entry order is irrelevant to validation but kept for a stable command line.
/// - `resources` is carried for completeness; it is not passed to the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationContext {
    /// Implementation guide identifiers.
    pub igs: Vec<String>,
    /// Profile identifiers.
    pub profiles: Vec<String>,
    /// Resource-type filters.
    pub resources: Vec<String>,
}

// ============================================================================
// SECTION: Expected Result
// ============================================================================

/// Overall validator status expected by a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedStatus {
    /// The validator produces no outcome lines.
    Success,
    /// The validator produces at least one outcome line.
    Failure,
}

impl ExpectedStatus {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Parses a wire label (`success` or `failure`).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "success" => Some(Self::Success),
            "failure" => Some(Self::Failure),
            _ => None,
        }
    }

    /// Derives the observed status from captured validator output.
    #[must_use]
    pub const fn observed(lines: &[String]) -> Self {
        if lines.is_empty() { Self::Success } else { Self::Failure }
    }
}

impl fmt::Display for ExpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invariant expression attached to an expectation.
///
/// # Invariants
/// - Carried in the model only; expressions are never evaluated by FUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invariant {
    /// Expression text.
    pub expression: String,
    /// Expected boolean result of the expression.
    pub expected: bool,
}

/// Structured expectation for one test case.
///
/// # Invariants
/// - `status` is never trusted on its own; the comparator re-derives it.
/// - Line lists are compared by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedResult {
    /// Expected overall status.
    pub status: ExpectedStatus,
    /// Error lines the output must contain.
    pub errors: Vec<String>,
    /// Warning lines the output must contain.
    pub warnings: Vec<String>,
    /// Informational lines the output must contain.
    pub informations: Vec<String>,
    /// Inert invariant expressions.
    pub invariants: Vec<Invariant>,
}

impl ExpectedResult {
    /// Creates an expectation with the given status and no expected lines.
    #[must_use]
    pub const fn new(status: ExpectedStatus) -> Self {
        Self {
            status,
            errors: Vec::new(),
            warnings: Vec::new(),
            informations: Vec::new(),
            invariants: Vec::new(),
        }
    }

    /// Returns true when `line` appears in any expected category.
    #[must_use]
    pub fn expects_line(&self, line: &str) -> bool {
        self.errors.iter().any(|expected| expected == line)
            || self.warnings.iter().any(|expected| expected == line)
            || self.informations.iter().any(|expected| expected == line)
    }
}
