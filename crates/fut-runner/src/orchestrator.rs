// crates/fut-runner/src/orchestrator.rs
// ============================================================================
// Module: Test Orchestrator
// Description: Loads test files, runs cases concurrently, assembles the report.
// Purpose: Drive one complete harness run under a global deadline.
// Dependencies: fut-core, time, tokio, tracing
// ============================================================================

//! ## Overview
//! [`Orchestrator::run`] loads every test file sequentially, dispatches one
//! unit of work per loaded case onto a bounded worker pool, and waits for the
//! pool to drain, for the global deadline to pass, or for a shutdown signal. Each unit invokes the
//! validator, compares the output against the expectation, and records the
//! outcome under the case identifier.
//!
//! Security posture: test files and validator output are untrusted; loading
//! failures are recorded per file and never abort the run.
//!
//! ## Invariants
//! - At most `workers` validator invocations are in flight at any instant.
//! - The outcome map lock is held only for a single insert.
//! - Cases without a recorded outcome are reported as not run.
//! - The report sink is called exactly once per run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use fut_core::CaseOutcome;
use fut_core::Discrepancy;
use fut_core::LoadFailure;
use fut_core::Report;
use fut_core::ReportError;
use fut_core::ReportInputs;
use fut_core::ReportSink;
use fut_core::TestCase;
use fut_core::TestCaseId;
use fut_core::TestCaseReader;
use fut_core::ValidatorInvoker;
use fut_core::compare;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default worker pool width.
const DEFAULT_WORKERS: usize = 4;
/// Default global deadline for the whole run.
const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// SECTION: Options
// ============================================================================

/// Run-level options for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum concurrent validator invocations. Zero is treated as one.
    pub workers: usize,
    /// Deadline for all dispatched work, measured from dispatch.
    pub global_timeout: Duration,
    /// Stop dispatching and cancel in-flight work on Ctrl-C.
    pub handle_interrupt: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            global_timeout: DEFAULT_GLOBAL_TIMEOUT,
            handle_interrupt: true,
        }
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Outcomes recorded by workers, keyed by test identifier.
type OutcomeMap = Arc<Mutex<HashMap<TestCaseId, CaseOutcome>>>;

/// How the wait for dispatched work ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    /// Every unit of work finished.
    Drained,
    /// The global deadline elapsed first.
    DeadlineElapsed,
    /// An interrupt arrived first.
    Interrupted,
}

/// Coordinates loading, concurrent validation, comparison, and reporting.
pub struct Orchestrator<R, V, S> {
    /// Test description loader.
    reader: R,
    /// Shared validator invoker.
    invoker: Arc<V>,
    /// Report consumer.
    sink: S,
    /// Run-level options.
    options: RunOptions,
}

impl<R, V, S> Orchestrator<R, V, S>
where
    R: TestCaseReader,
    V: ValidatorInvoker + 'static,
    S: ReportSink,
{
    /// Creates an orchestrator from its collaborators.
    #[must_use]
    pub fn new(reader: R, invoker: V, sink: S, options: RunOptions) -> Self {
        Self {
            reader,
            invoker: Arc::new(invoker),
            sink,
            options,
        }
    }

    /// Runs every test case declared in `test_files` and emits one report.
    ///
    /// Ctrl-C cancels outstanding work when `handle_interrupt` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report sink fails. Loading and
    /// validation failures are recorded in the report instead.
    pub async fn run(&self, test_files: &[PathBuf]) -> Result<Report, ReportError> {
        if self.options.handle_interrupt {
            self.run_until(test_files, interrupt_signal()).await
        } else {
            self.run_until(test_files, std::future::pending()).await
        }
    }

    /// Runs like [`Orchestrator::run`], cancelling outstanding work once
    /// `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report sink fails.
    pub async fn run_until<F>(&self, test_files: &[PathBuf], shutdown: F) -> Result<Report, ReportError>
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let (test_cases, load_failures) = self.load_all(test_files);
        let duplicate_test_ids = find_duplicates(&test_cases);
        info!(
            files = test_files.len(),
            test_cases = test_cases.len(),
            load_failures = load_failures.len(),
            "test cases loaded"
        );

        let outcomes: OutcomeMap = Arc::new(Mutex::new(HashMap::new()));
        let completion = self.dispatch(&test_cases, &outcomes, shutdown).await;
        let timed_out = completion != Completion::Drained;

        let outcomes = take_outcomes(&outcomes);
        let report = Report::assemble(ReportInputs {
            test_cases: &test_cases,
            outcomes: &outcomes,
            load_failures,
            duplicate_test_ids,
            elapsed: started.elapsed(),
            timestamp: now_rfc3339(),
            timed_out,
        });
        info!(
            total = report.total_tests,
            passed = report.passed,
            failed = report.failed,
            not_run = report.not_run,
            total_time_ms = report.total_time_ms,
            "run complete"
        );
        self.sink.write_report(&report)?;
        Ok(report)
    }

    /// Loads each file in order, recording per-file failures.
    fn load_all(&self, test_files: &[PathBuf]) -> (Vec<TestCase>, Vec<LoadFailure>) {
        let mut test_cases = Vec::new();
        let mut failures = Vec::new();
        for path in test_files {
            match self.reader.load_test_cases(path) {
                Ok(cases) => {
                    debug!(path = %path.display(), count = cases.len(), "test file loaded");
                    test_cases.extend(cases);
                }
                Err(err) => {
                    error!(path = %path.display(), error = %err, "failed to load test file");
                    failures.push(LoadFailure {
                        path: path.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }
        (test_cases, failures)
    }

    /// Submits one unit of work per test case and waits for completion.
    async fn dispatch<F>(&self, test_cases: &[TestCase], outcomes: &OutcomeMap, shutdown: F) -> Completion
    where
        F: Future<Output = ()>,
    {
        let permits = Arc::new(Semaphore::new(self.options.workers.max(1)));
        let mut tasks = JoinSet::new();
        for test_case in test_cases {
            let permits = Arc::clone(&permits);
            let invoker = Arc::clone(&self.invoker);
            let outcomes = Arc::clone(outcomes);
            let test_case = test_case.clone();
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                let outcome = run_case(invoker.as_ref(), &test_case).await;
                record_outcome(&outcomes, test_case.id, outcome);
            });
        }

        let completion = self.wait(&mut tasks, shutdown).await;
        match completion {
            Completion::Drained => {}
            Completion::DeadlineElapsed => {
                warn!(
                    timeout_ms = self.options.global_timeout.as_millis(),
                    pending = tasks.len(),
                    "global deadline elapsed; cancelling remaining tests"
                );
            }
            Completion::Interrupted => {
                warn!(pending = tasks.len(), "interrupted; cancelling remaining tests");
            }
        }
        if completion != Completion::Drained {
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
        completion
    }

    /// Waits until all tasks finish, the deadline passes, or `shutdown` resolves.
    ///
    /// Both the deadline and the shutdown future live across loop iterations
    /// so a signal raised between two task completions is not lost.
    async fn wait<F>(&self, tasks: &mut JoinSet<()>, shutdown: F) -> Completion
    where
        F: Future<Output = ()>,
    {
        let deadline = tokio::time::sleep(self.options.global_timeout);
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    None => return Completion::Drained,
                    Some(Err(err)) if err.is_panic() => {
                        error!(error = %err, "test worker panicked");
                    }
                    Some(_) => {}
                },
                () = &mut deadline => return Completion::DeadlineElapsed,
                () = &mut shutdown => return Completion::Interrupted,
            }
        }
    }
}

// ============================================================================
// SECTION: Unit of Work
// ============================================================================

/// Invokes the validator for one case and compares its output.
async fn run_case<V: ValidatorInvoker + ?Sized>(invoker: &V, test_case: &TestCase) -> CaseOutcome {
    let started = Instant::now();
    for invariant in &test_case.expected.invariants {
        debug!(
            test_id = %test_case.id,
            expression = %invariant.expression,
            expected = invariant.expected,
            "invariant recorded but not evaluated"
        );
    }
    let discrepancies = match invoker.invoke(test_case).await {
        Ok(lines) => compare(&lines, &test_case.expected),
        Err(err) => {
            warn!(test_id = %test_case.id, error = %err, "validator invocation failed");
            vec![Discrepancy::InvocationFailed {
                message: err.to_string(),
            }]
        }
    };
    if discrepancies.is_empty() {
        info!(test_id = %test_case.id, "test passed");
    } else {
        info!(test_id = %test_case.id, discrepancies = discrepancies.len(), "test failed");
    }
    CaseOutcome {
        discrepancies,
        elapsed: started.elapsed(),
    }
}

/// Records an outcome, holding the lock only for the insert.
fn record_outcome(outcomes: &OutcomeMap, test_id: TestCaseId, outcome: CaseOutcome) {
    let replaced = {
        let mut guard = outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(test_id.clone(), outcome).is_some()
    };
    if replaced {
        warn!(test_id = %test_id, "outcome overwritten by duplicate test id");
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves on Ctrl-C. Never resolves when the handler cannot be installed.
async fn interrupt_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "interrupt handler unavailable");
        std::future::pending::<()>().await;
    }
}

/// Returns identifiers declared more than once, in first-seen order.
fn find_duplicates(test_cases: &[TestCase]) -> Vec<TestCaseId> {
    let mut seen = HashSet::new();
    let mut reported = BTreeSet::new();
    let mut duplicates = Vec::new();
    for test_case in test_cases {
        if !seen.insert(&test_case.id) && reported.insert(&test_case.id) {
            warn!(test_id = %test_case.id, "duplicate test id; last result wins");
            duplicates.push(test_case.id.clone());
        }
    }
    duplicates
}

/// Moves recorded outcomes out of the shared map.
fn take_outcomes(outcomes: &OutcomeMap) -> HashMap<TestCaseId, CaseOutcome> {
    let mut guard = outcomes.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *guard)
}

/// Formats the current UTC time as RFC 3339.
fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|err| {
        warn!(error = %err, "timestamp formatting failed");
        String::new()
    })
}
