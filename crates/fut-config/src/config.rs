// crates/fut-config/src/config.rs
// ============================================================================
// Module: FUT Configuration
// Description: Configuration loading and validation for the FUT harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly requested file (CLI flag or `FUT_CONFIG`) must exist; the
//! implicit `./fut.toml` is optional and built-in defaults apply when it is
//! absent. Every section has defaults matching the reference deployment: the
//! validator runs as `java -jar validator/validator_cli.jar -version 4.0.1`
//! with a 30 second timeout, four workers, and a 60 second run deadline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "fut.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FUT_CONFIG";
/// Maximum size of a config file in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a full path string.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default validator program.
const DEFAULT_VALIDATOR_PROGRAM: &str = "java";
/// Default validator artifact (jar) path.
const DEFAULT_VALIDATOR_ARTIFACT: &str = "validator/validator_cli.jar";
/// Default protocol version passed via `-version`.
const DEFAULT_FHIR_VERSION: &str = "4.0.1";
/// Default per-invocation timeout in milliseconds.
const DEFAULT_VALIDATOR_TIMEOUT_MS: u64 = 30_000;
/// Minimum per-invocation timeout in milliseconds.
pub(crate) const MIN_VALIDATOR_TIMEOUT_MS: u64 = 100;
/// Maximum per-invocation timeout in milliseconds.
pub(crate) const MAX_VALIDATOR_TIMEOUT_MS: u64 = 3_600_000;
/// Default worker pool width.
const DEFAULT_WORKERS: usize = 4;
/// Maximum worker pool width.
pub(crate) const MAX_WORKERS: usize = 256;
/// Default run deadline in milliseconds.
const DEFAULT_GLOBAL_TIMEOUT_MS: u64 = 60_000;
/// Minimum run deadline in milliseconds.
pub(crate) const MIN_GLOBAL_TIMEOUT_MS: u64 = 100;
/// Maximum run deadline in milliseconds.
pub(crate) const MAX_GLOBAL_TIMEOUT_MS: u64 = 86_400_000;
/// Default directory searched for test description files.
const DEFAULT_TESTS_DIR: &str = "tests";
/// Default maximum size of a test description file.
const DEFAULT_SUITE_MAX_FILE_BYTES: usize = 1024 * 1024;
/// Maximum configurable size of a test description file.
pub(crate) const MAX_SUITE_MAX_FILE_BYTES: usize = 16 * 1024 * 1024;
/// Default report output path.
const DEFAULT_REPORT_PATH: &str = "reports/test-report.json";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// FUT harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HarnessConfig {
    /// External validator invocation settings.
    #[serde(default)]
    pub validator: ValidatorConfig,
    /// Worker pool and deadline settings.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Test suite discovery and loading settings.
    #[serde(default)]
    pub suite: SuiteConfig,
    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

impl HarnessConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then `FUT_CONFIG`, then `./fut.toml`.
    /// Only the implicit default may be absent, in which case built-in
    /// defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Parses and validates configuration from raw TOML bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the payload is oversized, not UTF-8,
    /// not valid TOML, or fails validation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validator.validate()?;
        self.runner.validate()?;
        self.suite.validate()?;
        self.report.validate()?;
        Ok(())
    }
}

/// External validator invocation settings.
///
/// The command line is `<program> <args...> -version <fhir_version> <instance>`
/// followed by the optional profile and implementation-guide flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Executable to run.
    pub program: String,
    /// Arguments placed before the protocol-version flag.
    pub args: Vec<String>,
    /// Optional artifact that must exist before invoking (for example a jar).
    pub artifact: Option<PathBuf>,
    /// Protocol version passed via `-version`.
    pub fhir_version: String,
    /// Per-invocation timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_VALIDATOR_PROGRAM.to_string(),
            args: vec!["-jar".to_string(), DEFAULT_VALIDATOR_ARTIFACT.to_string()],
            artifact: Some(PathBuf::from(DEFAULT_VALIDATOR_ARTIFACT)),
            fhir_version: DEFAULT_FHIR_VERSION.to_string(),
            timeout_ms: DEFAULT_VALIDATOR_TIMEOUT_MS,
        }
    }
}

impl ValidatorConfig {
    /// Returns the per-invocation timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates validator settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::Invalid("validator.program must be non-empty".to_string()));
        }
        validate_path_string("validator.program", &self.program)?;
        if let Some(artifact) = &self.artifact {
            validate_path_string("validator.artifact", &artifact.to_string_lossy())?;
        }
        if self.fhir_version.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "validator.fhir_version must be non-empty".to_string(),
            ));
        }
        if !(MIN_VALIDATOR_TIMEOUT_MS ..= MAX_VALIDATOR_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "validator.timeout_ms must be between {MIN_VALIDATOR_TIMEOUT_MS} and \
                 {MAX_VALIDATOR_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Worker pool and deadline settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of test cases executed concurrently.
    pub workers: usize,
    /// Deadline for the whole run in milliseconds.
    pub global_timeout_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            global_timeout_ms: DEFAULT_GLOBAL_TIMEOUT_MS,
        }
    }
}

impl RunnerConfig {
    /// Returns the run deadline.
    #[must_use]
    pub const fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    /// Validates runner settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::Invalid(format!(
                "runner.workers must be between 1 and {MAX_WORKERS}"
            )));
        }
        if !(MIN_GLOBAL_TIMEOUT_MS ..= MAX_GLOBAL_TIMEOUT_MS).contains(&self.global_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "runner.global_timeout_ms must be between {MIN_GLOBAL_TIMEOUT_MS} and \
                 {MAX_GLOBAL_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Test suite discovery and loading settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Directory searched for relative and wildcard test file arguments.
    pub tests_dir: PathBuf,
    /// Maximum size of one test description file in bytes.
    pub max_file_bytes: usize,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            tests_dir: PathBuf::from(DEFAULT_TESTS_DIR),
            max_file_bytes: DEFAULT_SUITE_MAX_FILE_BYTES,
        }
    }
}

impl SuiteConfig {
    /// Validates suite settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("suite.tests_dir", &self.tests_dir.to_string_lossy())?;
        if self.max_file_bytes == 0 || self.max_file_bytes > MAX_SUITE_MAX_FILE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "suite.max_file_bytes must be between 1 and {MAX_SUITE_MAX_FILE_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Path of the JSON report file.
    pub path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_REPORT_PATH),
        }
    }
}

impl ReportConfig {
    /// Validates report settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("report.path", &self.path.to_string_lossy())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// Returns the path and whether it was explicitly requested.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
