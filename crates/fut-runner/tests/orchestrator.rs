// crates/fut-runner/tests/orchestrator.rs
// ============================================================================
// Module: Orchestrator Tests
// Description: Exercises loading, concurrency, deadlines, and reporting.
// Purpose: Validate run semantics against in-memory collaborators.
// Dependencies: fut-core, fut-runner, async-trait, tokio
// ============================================================================
//! ## Overview
//! Uses fake readers, invokers, and sinks so the orchestrator can be tested
//! without spawning processes.

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
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use fut_core::ExpectedResult;
use fut_core::ExpectedStatus;
use fut_core::InvocationError;
use fut_core::LoadError;
use fut_core::Report;
use fut_core::ReportError;
use fut_core::ReportSink;
use fut_core::TestCase;
use fut_core::TestCaseId;
use fut_core::TestCaseReader;
use fut_core::TestStatus;
use fut_core::ValidationContext;
use fut_core::ValidatorInvoker;
use fut_runner::Orchestrator;
use fut_runner::RunOptions;

// ============================================================================
// SECTION: Fakes
// ============================================================================

#[derive(Default)]
struct FakeReader {
    files: HashMap<PathBuf, Vec<TestCase>>,
}

impl FakeReader {
    fn with_file(mut self, path: &str, cases: Vec<TestCase>) -> Self {
        self.files.insert(PathBuf::from(path), cases);
        self
    }
}

impl TestCaseReader for FakeReader {
    fn load_test_cases(&self, path: &Path) -> Result<Vec<TestCase>, LoadError> {
        self.files.get(path).cloned().ok_or_else(|| LoadError::NotFound {
            path: path.to_path_buf(),
        })
    }
}

#[derive(Clone)]
enum Behavior {
    Lines(Vec<String>),
    Fail,
    Sleep(Duration),
}

#[derive(Default)]
struct FakeInvoker {
    behaviors: HashMap<String, Behavior>,
    in_flight: AtomicUsize,
    max_in_flight: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    delay: Duration,
}

impl FakeInvoker {
    fn with(mut self, id: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(id.to_string(), behavior);
        self
    }
}

#[async_trait]
impl ValidatorInvoker for FakeInvoker {
    async fn invoke(&self, test_case: &TestCase) -> Result<Vec<String>, InvocationError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let behavior = self
            .behaviors
            .get(test_case.id.as_str())
            .cloned()
            .unwrap_or(Behavior::Lines(Vec::new()));
        let result = match behavior {
            Behavior::Lines(lines) => Ok(lines),
            Behavior::Fail => Err(InvocationError::MissingArtifact {
                test_id: test_case.id.clone(),
                path: test_case.instance_path.clone(),
            }),
            Behavior::Sleep(duration) => {
                tokio::time::sleep(duration).await;
                Ok(Vec::new())
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl ReportSink for RecordingSink {
    fn write_report(&self, report: &Report) -> Result<(), ReportError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

struct FailingSink;

impl ReportSink for FailingSink {
    fn write_report(&self, _report: &Report) -> Result<(), ReportError> {
        Err(ReportError::Io("disk full".to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn case(id: &str) -> TestCase {
    TestCase {
        id: TestCaseId::new(id),
        description: String::new(),
        instance_path: PathBuf::from(format!("instances/{id}.json")),
        context: ValidationContext::default(),
        expected: ExpectedResult::new(ExpectedStatus::Success),
    }
}

fn options(workers: usize, global_timeout: Duration) -> RunOptions {
    RunOptions {
        workers,
        global_timeout,
        handle_interrupt: false,
    }
}

fn files(paths: &[&str]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn report_has_one_entry_per_loaded_case_regardless_of_width() {
    for workers in [1, 3, 16] {
        let cases: Vec<TestCase> = (0 .. 10).map(|index| case(&format!("t{index}"))).collect();
        let reader = FakeReader::default().with_file("suite.yml", cases);
        let sink = RecordingSink::default();
        let orchestrator = Orchestrator::new(
            reader,
            FakeInvoker::default(),
            sink.clone(),
            options(workers, Duration::from_secs(10)),
        );
        let report = orchestrator.run(&files(&["suite.yml"])).await.unwrap();
        assert_eq!(report.total_tests, 10);
        assert_eq!(report.passed, 10);
        assert!(report.all_passed());
        assert!(!report.timed_out);
        let ids: Vec<String> = report.tests.iter().map(|test| test.test_id.to_string()).collect();
        let expected: Vec<String> = (0 .. 10).map(|index| format!("t{index}")).collect();
        assert_eq!(ids, expected);
        assert_eq!(sink.reports.lock().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn unreadable_file_is_recorded_and_skipped() {
    let reader = FakeReader::default().with_file("good.yml", vec![case("a")]);
    let orchestrator = Orchestrator::new(
        reader,
        FakeInvoker::default(),
        RecordingSink::default(),
        options(2, Duration::from_secs(10)),
    );
    let report = orchestrator.run(&files(&["missing.yml", "good.yml"])).await.unwrap();
    assert_eq!(report.total_tests, 1);
    assert_eq!(report.passed, 1);
    assert_eq!(report.load_failures.len(), 1);
    assert_eq!(report.load_failures[0].path, PathBuf::from("missing.yml"));
    assert!(!report.all_passed());
}

#[tokio::test]
async fn invocation_error_becomes_single_error_discrepancy() {
    let reader = FakeReader::default().with_file("suite.yml", vec![case("broken"), case("ok")]);
    let invoker = FakeInvoker::default().with("broken", Behavior::Fail);
    let orchestrator = Orchestrator::new(
        reader,
        invoker,
        RecordingSink::default(),
        options(2, Duration::from_secs(10)),
    );
    let report = orchestrator.run(&files(&["suite.yml"])).await.unwrap();
    let broken = &report.tests[0];
    assert_eq!(broken.status, TestStatus::Failure);
    assert_eq!(broken.discrepancies.len(), 1);
    let rendered = broken.discrepancies[0].to_string();
    assert!(rendered.starts_with("Error: "), "{rendered}");
    assert!(rendered.contains("broken"), "{rendered}");
    assert_eq!(report.tests[1].status, TestStatus::Success);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn output_is_compared_against_expectation() {
    let mut expected = case("a");
    expected.expected.errors = vec!["ERROR: bad".to_string()];
    let reader = FakeReader::default().with_file("suite.yml", vec![expected]);
    let invoker =
        FakeInvoker::default().with("a", Behavior::Lines(vec!["WARNING: meh".to_string()]));
    let orchestrator = Orchestrator::new(
        reader,
        invoker,
        RecordingSink::default(),
        options(1, Duration::from_secs(10)),
    );
    let report = orchestrator.run(&files(&["suite.yml"])).await.unwrap();
    let rendered: Vec<String> =
        report.tests[0].discrepancies.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "Status mismatch: expected success, got failure".to_string(),
            "Missing error: ERROR: bad".to_string(),
            "Unexpected output: WARNING: meh".to_string(),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn global_deadline_marks_stragglers_not_run() {
    let reader = FakeReader::default().with_file("suite.yml", vec![case("fast"), case("slow")]);
    let invoker = FakeInvoker::default().with("slow", Behavior::Sleep(Duration::from_secs(30)));
    let orchestrator = Orchestrator::new(
        reader,
        invoker,
        RecordingSink::default(),
        options(2, Duration::from_millis(300)),
    );
    let report = orchestrator.run(&files(&["suite.yml"])).await.unwrap();
    assert!(report.timed_out);
    assert_eq!(report.tests[0].status, TestStatus::Success);
    assert_eq!(report.tests[1].status, TestStatus::NotRun);
    assert_eq!(report.not_run, 1);
    assert!(!report.all_passed());
    assert!(report.total_time_ms < 30_000);
}

#[tokio::test]
async fn duplicate_ids_are_reported() {
    let reader = FakeReader::default()
        .with_file("one.yml", vec![case("dup"), case("x")])
        .with_file("two.yml", vec![case("dup")]);
    let orchestrator = Orchestrator::new(
        reader,
        FakeInvoker::default(),
        RecordingSink::default(),
        options(2, Duration::from_secs(10)),
    );
    let report = orchestrator.run(&files(&["one.yml", "two.yml"])).await.unwrap();
    assert_eq!(report.duplicate_test_ids, vec![TestCaseId::new("dup")]);
    assert_eq!(report.total_tests, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_never_exceeds_worker_count() {
    let cases: Vec<TestCase> = (0 .. 12).map(|index| case(&format!("c{index}"))).collect();
    let reader = FakeReader::default().with_file("suite.yml", cases);
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let invoker = FakeInvoker {
        max_in_flight: Arc::clone(&max_in_flight),
        delay: Duration::from_millis(20),
        ..FakeInvoker::default()
    };
    let orchestrator = Orchestrator::new(
        reader,
        invoker,
        RecordingSink::default(),
        options(3, Duration::from_secs(10)),
    );
    let report = orchestrator.run(&files(&["suite.yml"])).await.unwrap();
    assert_eq!(report.passed, 12);
    let observed = max_in_flight.load(Ordering::SeqCst);
    assert!(observed <= 3, "observed {observed} concurrent invocations");
    assert!(observed >= 1);
}

#[tokio::test]
async fn empty_input_produces_empty_report() {
    let sink = RecordingSink::default();
    let orchestrator = Orchestrator::new(
        FakeReader::default(),
        FakeInvoker::default(),
        sink.clone(),
        options(4, Duration::from_secs(1)),
    );
    let report = orchestrator.run(&[]).await.unwrap();
    assert_eq!(report.total_tests, 0);
    assert!(report.all_passed());
    assert_eq!(sink.reports.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sink_failure_is_propagated() {
    let reader = FakeReader::default().with_file("suite.yml", vec![case("a")]);
    let orchestrator = Orchestrator::new(
        reader,
        FakeInvoker::default(),
        FailingSink,
        options(1, Duration::from_secs(10)),
    );
    let error = orchestrator.run(&files(&["suite.yml"])).await.unwrap_err();
    assert!(error.to_string().contains("disk full"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_after_several_completions_cancels_remaining_work() {
    let reader = FakeReader::default().with_file(
        "suite.yml",
        vec![case("f0"), case("f1"), case("f2"), case("slow")],
    );
    let completed = Arc::new(AtomicUsize::new(0));
    let invoker = FakeInvoker {
        completed: Arc::clone(&completed),
        ..FakeInvoker::default()
    }
    .with("slow", Behavior::Sleep(Duration::from_secs(30)));
    let orchestrator = Orchestrator::new(
        reader,
        invoker,
        RecordingSink::default(),
        options(4, Duration::from_secs(30)),
    );
    let shutdown = async move {
        while completed.load(Ordering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        // Outcomes are recorded right after the invoker returns.
        tokio::time::sleep(Duration::from_millis(100)).await;
    };
    let report = orchestrator.run_until(&files(&["suite.yml"]), shutdown).await.unwrap();
    assert!(report.timed_out);
    assert_eq!(report.passed, 3);
    assert_eq!(report.tests[3].status, TestStatus::NotRun);
    assert!(report.total_time_ms < 10_000, "took {} ms", report.total_time_ms);
}

#[tokio::test]
async fn shutdown_that_never_fires_lets_run_drain() {
    let reader = FakeReader::default().with_file("suite.yml", vec![case("a"), case("b")]);
    let orchestrator = Orchestrator::new(
        reader,
        FakeInvoker::default(),
        RecordingSink::default(),
        options(2, Duration::from_secs(10)),
    );
    let report =
        orchestrator.run_until(&files(&["suite.yml"]), std::future::pending()).await.unwrap();
    assert!(!report.timed_out);
    assert_eq!(report.passed, 2);
}
