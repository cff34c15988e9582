// crates/fut-core/src/interfaces/mod.rs
// ============================================================================
// Module: FUT Interfaces
// Description: Collaborator contracts for loading, invoking, and reporting.
// Purpose: Define the seams the orchestrator is generic over.
// Dependencies: crate::core, async-trait, thiserror
// ============================================================================

//! ## Overview
//! The orchestrator depends on three collaborators: a [`TestCaseReader`] that
//! turns description files into [`TestCase`] values, a [`ValidatorInvoker`]
//! that runs the external validator for one case, and a [`ReportSink`] that
//! persists or displays the final [`Report`]. Implementations live in other
//! crates so the core stays free of I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::identifiers::TestCaseId;
use crate::core::model::TestCase;
use crate::core::report::Report;

// ============================================================================
// SECTION: Test Case Reader
// ============================================================================

/// Errors raised while loading a test description file.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("test file not found: {}", .path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },
    /// The file exists but could not be read.
    #[error("test file unreadable: {}: {message}", .path.display())]
    Unreadable {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O message.
        message: String,
    },
    /// The file is empty or holds an empty document.
    #[error("test file is empty: {}", .path.display())]
    Empty {
        /// Path that was requested.
        path: PathBuf,
    },
    /// The file exceeds the configured size limit.
    #[error("test file exceeds size limit ({size} > {limit} bytes): {}", .path.display())]
    TooLarge {
        /// Path that was requested.
        path: PathBuf,
        /// Observed size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// The file is not a well-formed test description.
    #[error("malformed test file {}: {message}", .path.display())]
    Malformed {
        /// Path that was requested.
        path: PathBuf,
        /// Parser or schema message.
        message: String,
    },
}

/// Loads declarative test cases from a description file.
pub trait TestCaseReader {
    /// Loads every test case declared in `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the file is missing, unreadable, empty, or malformed.
    fn load_test_cases(&self, path: &Path) -> Result<Vec<TestCase>, LoadError>;
}

// ============================================================================
// SECTION: Validator Invoker
// ============================================================================

/// Errors raised while invoking the external validator for one test case.
///
/// # Invariants
/// - Every variant names the test identifier it belongs to.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The instance artifact is missing or unreadable.
    #[error("invalid instance artifact for test {test_id}: {}", .path.display())]
    MissingArtifact {
        /// Test identifier.
        test_id: TestCaseId,
        /// Resolved artifact path.
        path: PathBuf,
    },
    /// The validator executable or its artifact is missing.
    #[error("validator not found for test {test_id}: {target}")]
    MissingValidator {
        /// Test identifier.
        test_id: TestCaseId,
        /// Program or artifact that could not be found.
        target: String,
    },
    /// The validator exceeded its wall-clock timeout.
    #[error("validator timed out after {}ms for test {test_id}", .timeout.as_millis())]
    Timeout {
        /// Test identifier.
        test_id: TestCaseId,
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// The validator exited with a non-zero status.
    #[error("validator returned error for test {test_id} (exit {exit}): {output}")]
    NonZeroExit {
        /// Test identifier.
        test_id: TestCaseId,
        /// Exit code, or `signal` when terminated by a signal.
        exit: String,
        /// Full captured output joined by newlines.
        output: String,
    },
    /// Spawning or capturing the validator process failed.
    #[error("failed to run validator for test {test_id}: {message}")]
    Io {
        /// Test identifier.
        test_id: TestCaseId,
        /// Underlying I/O message.
        message: String,
    },
}

/// Runs the external validator for one test case.
#[async_trait]
pub trait ValidatorInvoker: Send + Sync {
    /// Invokes the validator and returns its merged output lines.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when the artifact or validator is missing,
    /// the process times out, exits non-zero, or its output cannot be captured.
    async fn invoke(&self, test_case: &TestCase) -> Result<Vec<String>, InvocationError>;
}

// ============================================================================
// SECTION: Report Sink
// ============================================================================

/// Errors raised while persisting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report serialization failed.
    #[error("report serialization failed: {0}")]
    Serialize(String),
    /// Writing the report failed.
    #[error("report write failed: {0}")]
    Io(String),
}

/// Consumes the final aggregate of one run.
pub trait ReportSink {
    /// Persists or displays the report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report cannot be serialized or written.
    fn write_report(&self, report: &Report) -> Result<(), ReportError>;
}
