// crates/fut-core/tests/report.rs
// ============================================================================
// Module: Report Assembly Tests
// Description: Verifies joining of loaded test cases with recorded outcomes.
// Dependencies: fut-core
// ============================================================================
//! ## Overview
//! Ensures reports follow load order, count passes and failures, and mark
//! test cases without an outcome as not run instead of passed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use fut_core::CaseOutcome;
use fut_core::Discrepancy;
use fut_core::ExpectedResult;
use fut_core::ExpectedStatus;
use fut_core::LoadFailure;
use fut_core::Report;
use fut_core::ReportInputs;
use fut_core::TestCase;
use fut_core::TestCaseId;
use fut_core::TestStatus;
use fut_core::ValidationContext;

fn test_case(id: &str) -> TestCase {
    TestCase {
        id: TestCaseId::new(id),
        description: format!("case {id}"),
        instance_path: PathBuf::from(format!("instances/{id}.json")),
        context: ValidationContext::default(),
        expected: ExpectedResult::new(ExpectedStatus::Success),
    }
}

fn outcome(discrepancies: Vec<Discrepancy>, millis: u64) -> CaseOutcome {
    CaseOutcome {
        discrepancies,
        elapsed: Duration::from_millis(millis),
    }
}

fn assemble(cases: &[TestCase], outcomes: &HashMap<TestCaseId, CaseOutcome>) -> Report {
    Report::assemble(ReportInputs {
        test_cases: cases,
        outcomes,
        load_failures: Vec::new(),
        duplicate_test_ids: Vec::new(),
        elapsed: Duration::from_millis(1_500),
        timestamp: "2026-01-01T00:00:00Z".to_string(),
        timed_out: false,
    })
}

#[test]
fn report_follows_load_order_and_counts() {
    let cases = vec![test_case("b"), test_case("a"), test_case("c")];
    let mut outcomes = HashMap::new();
    outcomes.insert(TestCaseId::new("a"), outcome(Vec::new(), 5));
    outcomes.insert(
        TestCaseId::new("b"),
        outcome(
            vec![Discrepancy::Unexpected {
                line: "x".to_string(),
            }],
            7,
        ),
    );
    outcomes.insert(TestCaseId::new("c"), outcome(Vec::new(), 9));

    let report = assemble(&cases, &outcomes);
    let ids: Vec<&str> = report.tests.iter().map(|test| test.test_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(report.total_tests, 3);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.not_run, 0);
    assert_eq!(report.total_time_ms, 1_500);
    assert_eq!(report.tests[0].status, TestStatus::Failure);
    assert_eq!(report.tests[0].execution_time_ms, 7);
    assert!(!report.all_passed());
}

#[test]
fn missing_outcome_is_not_run_not_passed() {
    let cases = vec![test_case("done"), test_case("straggler")];
    let mut outcomes = HashMap::new();
    outcomes.insert(TestCaseId::new("done"), outcome(Vec::new(), 1));

    let report = assemble(&cases, &outcomes);
    assert_eq!(report.passed, 1);
    assert_eq!(report.not_run, 1);
    assert_eq!(report.tests[1].status, TestStatus::NotRun);
    assert!(!report.all_passed());
    let unsuccessful: Vec<&str> =
        report.unsuccessful().map(|test| test.test_id.as_str()).collect();
    assert_eq!(unsuccessful, vec!["straggler"]);
}

#[test]
fn load_failures_prevent_all_passed() {
    let cases = vec![test_case("a")];
    let mut outcomes = HashMap::new();
    outcomes.insert(TestCaseId::new("a"), outcome(Vec::new(), 1));
    let report = Report::assemble(ReportInputs {
        test_cases: &cases,
        outcomes: &outcomes,
        load_failures: vec![LoadFailure {
            path: PathBuf::from("broken.yml"),
            message: "malformed".to_string(),
        }],
        duplicate_test_ids: Vec::new(),
        elapsed: Duration::ZERO,
        timestamp: "2026-01-01T00:00:00Z".to_string(),
        timed_out: false,
    });
    assert_eq!(report.passed, 1);
    assert!(!report.all_passed());
}

#[test]
fn report_serializes_wire_fields() {
    let cases = vec![test_case("a")];
    let outcomes = HashMap::new();
    let report = assemble(&cases, &outcomes);
    let value = serde_json::to_value(&report).expect("serialize");
    assert_eq!(value["total_tests"], 1);
    assert_eq!(value["tests"][0]["test_id"], "a");
    assert_eq!(value["tests"][0]["status"], "not_run");
    assert_eq!(value["timestamp"], "2026-01-01T00:00:00Z");
}
