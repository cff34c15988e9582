// crates/fut-core/src/core/discrepancy.rs
// ============================================================================
// Module: FUT Discrepancies
// Description: Human-readable mismatches between expected and actual outcomes.
// Purpose: Give every mismatch a typed form and a stable rendered string.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Discrepancy`] is one mismatch found by the comparator, or one
//! synthetic entry standing in for a failed validator invocation. Reports
//! serialize discrepancies as their rendered strings, which are kept
//! byte-stable so existing report consumers keep working.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde::Serializer;

use crate::core::model::ExpectedStatus;

// ============================================================================
// SECTION: Outcome Categories
// ============================================================================

/// Category of an expected outcome line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCategory {
    /// Expected error line.
    Error,
    /// Expected warning line.
    Warning,
    /// Expected informational line.
    Information,
}

impl OutcomeCategory {
    /// Returns the label used in rendered discrepancies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
        }
    }
}

// ============================================================================
// SECTION: Discrepancy
// ============================================================================

/// One mismatch between an expectation and a validator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// Observed status differs from the expected status.
    StatusMismatch {
        /// Status declared by the test case.
        expected: ExpectedStatus,
        /// Status derived from the captured output.
        observed: ExpectedStatus,
    },
    /// An expected line is absent from the output.
    Missing {
        /// Category the line was expected under.
        category: OutcomeCategory,
        /// Expected line text.
        line: String,
    },
    /// An output line matches no expected category.
    Unexpected {
        /// Output line text.
        line: String,
    },
    /// The validator could not be invoked or did not complete cleanly.
    InvocationFailed {
        /// Rendered invocation error.
        message: String,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusMismatch {
                expected,
                observed,
            } => write!(f, "Status mismatch: expected {expected}, got {observed}"),
            Self::Missing {
                category,
                line,
            } => write!(f, "Missing {}: {line}", category.as_str()),
            Self::Unexpected {
                line,
            } => write!(f, "Unexpected output: {line}"),
            Self::InvocationFailed {
                message,
            } => write!(f, "Error: {message}"),
        }
    }
}

impl Serialize for Discrepancy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
