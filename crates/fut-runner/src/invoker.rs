// crates/fut-runner/src/invoker.rs
// ============================================================================
// Module: Validator Process Invoker
// Description: Runs the external validator for one test case.
// Purpose: Build the command line, bound execution time, capture output.
// Dependencies: fut-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`ProcessValidator`] spawns one independent validator process per test
//! case. Stdout and stderr are captured together as a single ordered line
//! sequence (lines are appended in arrival order), and that sequence is the
//! actual output handed to the comparator.
//!
//! The whole execution, output capture included, is bounded by the configured
//! timeout. On expiry the process is killed and reaped. The child is spawned
//! with kill-on-drop so every other exit path (I/O errors, task abort) also
//! terminates it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use fut_core::InvocationError;
use fut_core::TestCase;
use fut_core::TestCaseId;
use fut_core::ValidatorInvoker;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Flag carrying the protocol version.
const VERSION_FLAG: &str = "-version";
/// Flag carrying comma-joined profile identifiers.
const PROFILE_FLAG: &str = "-profile";
/// Flag carrying comma-joined implementation guide identifiers.
const IG_FLAG: &str = "-ig";
/// Reference validator executable.
const DEFAULT_PROGRAM: &str = "java";
/// Reference validator artifact.
const DEFAULT_ARTIFACT: &str = "validator/validator_cli.jar";
/// Reference protocol version.
const DEFAULT_FHIR_VERSION: &str = "4.0.1";
/// Reference per-invocation timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SECTION: Command Description
// ============================================================================

/// How to invoke the external validator.
///
/// # Invariants
/// - `args` precede the protocol-version flag on every command line.
/// - When `artifact` is set it must exist before any process is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorCommand {
    /// Executable to spawn.
    pub program: PathBuf,
    /// Fixed arguments placed before the protocol-version flag.
    pub args: Vec<String>,
    /// Optional artifact required by the executable (for example a jar).
    pub artifact: Option<PathBuf>,
    /// Protocol version passed via `-version`.
    pub fhir_version: String,
    /// Hard wall-clock timeout per invocation.
    pub timeout: Duration,
}

impl Default for ValidatorCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            args: vec!["-jar".to_string(), DEFAULT_ARTIFACT.to_string()],
            artifact: Some(PathBuf::from(DEFAULT_ARTIFACT)),
            fhir_version: DEFAULT_FHIR_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ============================================================================
// SECTION: Process Validator
// ============================================================================

/// Validator invoker backed by an external process.
#[derive(Debug, Clone)]
pub struct ProcessValidator {
    /// Invocation settings.
    command: ValidatorCommand,
}

impl ProcessValidator {
    /// Creates a process validator from invocation settings.
    #[must_use]
    pub const fn new(command: ValidatorCommand) -> Self {
        Self {
            command,
        }
    }

    /// Builds the argument vector (excluding the program) for a test case.
    ///
    /// Profile and implementation-guide flags are only emitted when the
    /// corresponding context list is non-empty.
    #[must_use]
    pub fn build_args(&self, test_case: &TestCase) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.command.args.iter().map(OsString::from).collect();
        args.push(OsString::from(VERSION_FLAG));
        args.push(OsString::from(&self.command.fhir_version));
        args.push(test_case.instance_path.clone().into_os_string());

        let context = &test_case.context;
        if !context.profiles.is_empty() {
            args.push(OsString::from(PROFILE_FLAG));
            args.push(OsString::from(context.profiles.join(",")));
        }
        if !context.igs.is_empty() {
            args.push(OsString::from(IG_FLAG));
            args.push(OsString::from(context.igs.join(",")));
        }
        args
    }

    /// Ensures the instance artifact exists and can be opened for reading.
    async fn check_instance(test_case: &TestCase) -> Result<(), InvocationError> {
        let missing = || InvocationError::MissingArtifact {
            test_id: test_case.id.clone(),
            path: test_case.instance_path.clone(),
        };
        let metadata = tokio::fs::metadata(&test_case.instance_path).await.map_err(|_| missing())?;
        if !metadata.is_file() {
            return Err(missing());
        }
        tokio::fs::File::open(&test_case.instance_path).await.map_err(|_| missing())?;
        Ok(())
    }

    /// Ensures the configured validator artifact exists.
    fn check_validator(&self, test_id: &TestCaseId) -> Result<(), InvocationError> {
        if let Some(artifact) = &self.command.artifact
            && !artifact.exists()
        {
            return Err(InvocationError::MissingValidator {
                test_id: test_id.clone(),
                target: artifact.display().to_string(),
            });
        }
        Ok(())
    }

    /// Spawns the validator and waits for it within the configured timeout.
    async fn execute(
        &self,
        args: Vec<OsString>,
        test_id: &TestCaseId,
    ) -> Result<Vec<String>, InvocationError> {
        let mut command = Command::new(&self.command.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                InvocationError::MissingValidator {
                    test_id: test_id.clone(),
                    target: self.command.program.display().to_string(),
                }
            } else {
                InvocationError::Io {
                    test_id: test_id.clone(),
                    message: format!("spawn failed: {err}"),
                }
            }
        })?;

        let run = async {
            let lines = capture_merged_output(&mut child).await?;
            let status = child.wait().await?;
            Ok::<_, io::Error>((lines, status))
        };

        let outcome = timeout(self.command.timeout, run).await;
        match outcome {
            Ok(Ok((lines, status))) => {
                if status.success() {
                    Ok(lines)
                } else {
                    Err(InvocationError::NonZeroExit {
                        test_id: test_id.clone(),
                        exit: exit_label(status),
                        output: lines.join("\n"),
                    })
                }
            }
            Ok(Err(err)) => {
                terminate(&mut child, test_id).await;
                Err(InvocationError::Io {
                    test_id: test_id.clone(),
                    message: format!("output capture failed: {err}"),
                })
            }
            Err(_) => {
                warn!(test_id = %test_id, timeout_ms = self.command.timeout.as_millis(), "validator timed out");
                terminate(&mut child, test_id).await;
                Err(InvocationError::Timeout {
                    test_id: test_id.clone(),
                    timeout: self.command.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl ValidatorInvoker for ProcessValidator {
    async fn invoke(&self, test_case: &TestCase) -> Result<Vec<String>, InvocationError> {
        info!(
            test_id = %test_case.id,
            instance = %test_case.instance_path.display(),
            "invoking validator"
        );
        Self::check_instance(test_case).await?;
        self.check_validator(&test_case.id)?;

        let args = self.build_args(test_case);
        debug!(
            test_id = %test_case.id,
            program = %self.command.program.display(),
            args = %render_args(&args),
            "validator command line"
        );
        let lines = self.execute(args, &test_case.id).await?;
        debug!(test_id = %test_case.id, lines = lines.len(), "validator completed");
        Ok(lines)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads stdout and stderr concurrently into one line sequence.
///
/// Lines are appended in arrival order. Invalid UTF-8 is replaced and line
/// terminators (`\n` or `\r\n`) are stripped.
async fn capture_merged_output(child: &mut Child) -> io::Result<Vec<String>> {
    let stdout = child.stdout.take().ok_or_else(|| io::Error::other("stdout not captured"))?;
    let stderr = child.stderr.take().ok_or_else(|| io::Error::other("stderr not captured"))?;
    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut lines = Vec::new();

    while stdout_open || stderr_open {
        tokio::select! {
            read = stdout.read_until(b'\n', &mut stdout_buf), if stdout_open => {
                stdout_open = take_line(read?, &mut stdout_buf, &mut lines);
            }
            read = stderr.read_until(b'\n', &mut stderr_buf), if stderr_open => {
                stderr_open = take_line(read?, &mut stderr_buf, &mut lines);
            }
        }
    }
    Ok(lines)
}

/// Moves a completed line out of `buffer`. Returns false at end of stream.
fn take_line(read: usize, buffer: &mut Vec<u8>, lines: &mut Vec<String>) -> bool {
    if read == 0 {
        if !buffer.is_empty() {
            lines.push(decode_line(buffer));
            buffer.clear();
        }
        return false;
    }
    if buffer.last() == Some(&b'\n') {
        lines.push(decode_line(buffer));
        buffer.clear();
    }
    true
}

/// Decodes one raw line, dropping its terminator.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Joins arguments for log output.
fn render_args(args: &[OsString]) -> String {
    args.iter().map(|arg| arg.to_string_lossy()).collect::<Vec<_>>().join(" ")
}

/// Renders an exit status for error messages.
fn exit_label(status: ExitStatus) -> String {
    status.code().map_or_else(|| "signal".to_string(), |code| code.to_string())
}

/// Kills the child and reaps it.
async fn terminate(child: &mut Child, test_id: &TestCaseId) {
    if let Err(err) = child.start_kill() {
        debug!(test_id = %test_id, error = %err, "validator kill failed");
    }
    if let Err(err) = child.wait().await {
        debug!(test_id = %test_id, error = %err, "validator reap failed");
    }
}
