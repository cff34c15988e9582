// crates/fut-core/src/core/identifiers.rs
// ============================================================================
// Module: FUT Identifiers
// Description: Opaque identifiers for declarative test cases.
// Purpose: Provide a strongly typed join key between execution and reporting.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`TestCaseId`] is the only key used to join a test case with its
//! execution outcome. Uniqueness within one invocation is expected but not
//! enforced by this type; the orchestrator detects collisions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Test case identifier declared by a test description file.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseId(String);

impl TestCaseId {
    /// Creates a new test case identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TestCaseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
