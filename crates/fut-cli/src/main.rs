// crates/fut-cli/src/main.rs
// ============================================================================
// Module: FUT CLI Entry Point
// Description: Command dispatcher for validator conformance runs.
// Purpose: Wire configuration, test files, and the orchestrator into one run.
// Dependencies: clap, fut-config, fut-core, fut-runner, fut-suite, thiserror,
// tokio, tracing, tracing-subscriber.
// ============================================================================

//! ## Overview
//! `fut run` resolves the given test files, runs every declared test case
//! against the external validator, writes the JSON report, and prints a
//! summary. The exit code is zero only when every test passed and every test
//! file loaded. `fut config` validates or prints the configuration file.
//!
//! Logs go to stderr through `tracing-subscriber`; `RUST_LOG` overrides the
//! default level and `--verbose` lowers it to debug.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use fut_config::HarnessConfig;
use fut_config::ValidatorConfig;
use fut_config::config_toml_example;
use fut_core::Report;
use fut_core::TestStatus;
use fut_runner::Orchestrator;
use fut_runner::ProcessValidator;
use fut_runner::RunOptions;
use fut_runner::ValidatorCommand;
use fut_suite::JsonReportWriter;
use fut_suite::YamlTestCaseReader;
use fut_suite::resolve_test_files;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "fut", version, disable_help_subcommand = true)]
struct Cli {
    /// Configuration file (overrides `FUT_CONFIG` and `./fut.toml`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(long, short = 'v', action = ArgAction::SetTrue, global = true)]
    verbose: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run test files against the external validator.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `fut run`.
#[derive(Args, Debug, Default)]
struct RunCommand {
    /// Test files, relative names under the tests directory, or `*` patterns.
    #[arg(value_name = "FILES", required = true)]
    files: Vec<String>,
    /// Worker pool width.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
    /// Global deadline for the whole run, in seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
    /// Per-invocation validator timeout, in seconds.
    #[arg(long, value_name = "SECS")]
    validator_timeout_secs: Option<u64>,
    /// Report output path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration, then exit.
    Validate,
    /// Print a complete example configuration.
    Example,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(cli.config, command).await,
        Commands::Config {
            command,
        } => command_config(cli.config, &command),
    }
}

/// Installs the stderr log subscriber.
fn init_tracing(verbose: bool) -> CliResult<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(config_path: Option<PathBuf>, command: RunCommand) -> CliResult<ExitCode> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &command)?;
    debug!(
        workers = config.runner.workers,
        global_timeout_ms = config.runner.global_timeout_ms,
        validator_timeout_ms = config.validator.timeout_ms,
        report = %config.report.path.display(),
        "effective configuration"
    );

    let files = resolve_test_files(&command.files, &config.suite.tests_dir)
        .map_err(|err| CliError::new(err.to_string()))?;
    let orchestrator = Orchestrator::new(
        YamlTestCaseReader::new(config.suite.max_file_bytes),
        ProcessValidator::new(validator_command(&config.validator)),
        JsonReportWriter::new(config.report.path.clone()),
        RunOptions {
            workers: config.runner.workers,
            global_timeout: config.runner.global_timeout(),
            handle_interrupt: true,
        },
    );
    let report = orchestrator.run(&files).await.map_err(|err| CliError::new(err.to_string()))?;

    let summary = render_summary(&report, &config.report.path);
    write_stdout_line(summary.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(if report.all_passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Applies command-line overrides and re-validates the result.
fn apply_overrides(config: &mut HarnessConfig, command: &RunCommand) -> CliResult<()> {
    if let Some(workers) = command.workers {
        config.runner.workers = workers;
    }
    if let Some(secs) = command.timeout_secs {
        config.runner.global_timeout_ms = secs_to_ms("--timeout-secs", secs)?;
    }
    if let Some(secs) = command.validator_timeout_secs {
        config.validator.timeout_ms = secs_to_ms("--validator-timeout-secs", secs)?;
    }
    if let Some(report) = &command.report {
        config.report.path.clone_from(report);
    }
    config.validate().map_err(|err| CliError::new(format!("invalid options: {err}")))
}

/// Converts a seconds flag to milliseconds.
fn secs_to_ms(flag: &str, secs: u64) -> CliResult<u64> {
    secs.checked_mul(1_000).ok_or_else(|| CliError::new(format!("{flag} is too large")))
}

/// Builds the process invocation settings from validator configuration.
fn validator_command(config: &ValidatorConfig) -> ValidatorCommand {
    ValidatorCommand {
        program: PathBuf::from(&config.program),
        args: config.args.clone(),
        artifact: config.artifact.clone(),
        fhir_version: config.fhir_version.clone(),
        timeout: Duration::from_millis(config.timeout_ms),
    }
}

/// Renders the end-of-run summary.
fn render_summary(report: &Report, report_path: &std::path::Path) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Tests: {} total, {} passed, {} failed, {} not run ({} ms)",
        report.total_tests, report.passed, report.failed, report.not_run, report.total_time_ms
    );
    if report.timed_out {
        let _ = writeln!(out, "Run stopped before all tests finished.");
    }
    for failure in &report.load_failures {
        let _ = writeln!(out, "Could not load {}: {}", failure.path.display(), failure.message);
    }
    for test in report.unsuccessful() {
        match test.status {
            TestStatus::NotRun => {
                let _ = writeln!(out, "NOT RUN {}", test.test_id);
            }
            TestStatus::Failure | TestStatus::Success => {
                let _ = writeln!(out, "FAILED {}", test.test_id);
                for discrepancy in &test.discrepancies {
                    let _ = writeln!(out, "  - {discrepancy}");
                }
            }
        }
    }
    if !report.duplicate_test_ids.is_empty() {
        let ids: Vec<&str> =
            report.duplicate_test_ids.iter().map(fut_core::TestCaseId::as_str).collect();
        let _ = writeln!(out, "Duplicate test ids: {}", ids.join(", "));
    }
    let _ = writeln!(out, "Report: {}", report_path.display());
    out
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(config_path: Option<PathBuf>, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            let _config = load_config(config_path)?;
            write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        ConfigCommand::Example => {
            let example = config_toml_example();
            write_stdout_line(example.trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration from the resolved path.
fn load_config(path: Option<PathBuf>) -> CliResult<HarnessConfig> {
    HarnessConfig::load(path.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
