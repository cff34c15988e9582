// crates/fut-core/src/core/report.rs
// ============================================================================
// Module: FUT Run Reports
// Description: Per-test outcomes and the aggregate run report.
// Purpose: Turn the orchestrator's outcome map into a write-once summary.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The orchestrator records one [`CaseOutcome`] per test identifier. Once the
//! run finishes (or its deadline fires), [`Report::assemble`] walks the loaded
//! test cases in load order and joins them with their outcomes. Test cases
//! whose outcome never landed are reported as [`TestStatus::NotRun`], never as
//! passed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::core::discrepancy::Discrepancy;
use crate::core::identifiers::TestCaseId;
use crate::core::model::TestCase;

// ============================================================================
// SECTION: Case Outcomes
// ============================================================================

/// Result of one unit of work: discrepancies plus its wall time.
///
/// # Invariants
/// - An empty discrepancy list means the test case passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    /// Discrepancies found for the test case.
    pub discrepancies: Vec<Discrepancy>,
    /// Wall time spent invoking and comparing.
    pub elapsed: Duration,
}

impl CaseOutcome {
    /// Returns true when no discrepancy was recorded.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// A test description file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// Path of the description file.
    pub path: PathBuf,
    /// Rendered load error.
    pub message: String,
}

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Final status of one test case in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// No discrepancies were found.
    Success,
    /// At least one discrepancy was found.
    Failure,
    /// No outcome landed before the run ended.
    NotRun,
}

/// Report entry for one loaded test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    /// Test case identifier.
    pub test_id: TestCaseId,
    /// Test case description.
    pub description: String,
    /// Final status.
    pub status: TestStatus,
    /// Discrepancy detail (empty on success and when not run).
    pub discrepancies: Vec<Discrepancy>,
    /// Wall time of the unit of work in milliseconds.
    pub execution_time_ms: u64,
}

/// Aggregate summary of one harness invocation.
///
/// # Invariants
/// - `tests` follows load order (file order, then in-file order).
/// - `total_tests == passed + failed + not_run`.
/// - Built once per run and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Per-test detail in load order.
    pub tests: Vec<TestReport>,
    /// Number of loaded test cases.
    pub total_tests: usize,
    /// Number of passing test cases.
    pub passed: usize,
    /// Number of failing test cases.
    pub failed: usize,
    /// Number of test cases without an outcome.
    pub not_run: usize,
    /// Total wall time of the run in milliseconds.
    pub total_time_ms: u64,
    /// Completion timestamp (RFC 3339).
    pub timestamp: String,
    /// True when the global deadline or an interrupt cut the run short.
    pub timed_out: bool,
    /// Description files that failed to load.
    pub load_failures: Vec<LoadFailure>,
    /// Identifiers declared more than once in this invocation.
    pub duplicate_test_ids: Vec<TestCaseId>,
}

/// Inputs required to assemble a [`Report`].
#[derive(Debug)]
pub struct ReportInputs<'a> {
    /// Loaded test cases in load order.
    pub test_cases: &'a [TestCase],
    /// Outcomes keyed by test identifier.
    pub outcomes: &'a HashMap<TestCaseId, CaseOutcome>,
    /// Description files that failed to load.
    pub load_failures: Vec<LoadFailure>,
    /// Identifiers declared more than once.
    pub duplicate_test_ids: Vec<TestCaseId>,
    /// Total wall time of the run.
    pub elapsed: Duration,
    /// Completion timestamp supplied by the host (RFC 3339).
    pub timestamp: String,
    /// Whether the run was cut short.
    pub timed_out: bool,
}

impl Report {
    /// Joins loaded test cases with their outcomes.
    #[must_use]
    pub fn assemble(inputs: ReportInputs<'_>) -> Self {
        let mut tests = Vec::with_capacity(inputs.test_cases.len());
        let mut passed = 0;
        let mut failed = 0;
        let mut not_run = 0;

        for test_case in inputs.test_cases {
            let entry = match inputs.outcomes.get(&test_case.id) {
                Some(outcome) => {
                    let status = if outcome.passed() {
                        passed += 1;
                        TestStatus::Success
                    } else {
                        failed += 1;
                        TestStatus::Failure
                    };
                    TestReport {
                        test_id: test_case.id.clone(),
                        description: test_case.description.clone(),
                        status,
                        discrepancies: outcome.discrepancies.clone(),
                        execution_time_ms: duration_ms(outcome.elapsed),
                    }
                }
                None => {
                    not_run += 1;
                    TestReport {
                        test_id: test_case.id.clone(),
                        description: test_case.description.clone(),
                        status: TestStatus::NotRun,
                        discrepancies: Vec::new(),
                        execution_time_ms: 0,
                    }
                }
            };
            tests.push(entry);
        }

        Self {
            total_tests: tests.len(),
            tests,
            passed,
            failed,
            not_run,
            total_time_ms: duration_ms(inputs.elapsed),
            timestamp: inputs.timestamp,
            timed_out: inputs.timed_out,
            load_failures: inputs.load_failures,
            duplicate_test_ids: inputs.duplicate_test_ids,
        }
    }

    /// Returns true when every loaded test passed and no file failed to load.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.not_run == 0 && self.load_failures.is_empty()
    }

    /// Returns the entries that did not pass.
    pub fn unsuccessful(&self) -> impl Iterator<Item = &TestReport> {
        self.tests.iter().filter(|test| test.status != TestStatus::Success)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
