// crates/fut-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `fut config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for FUT configuration. The output mirrors the built-in
//! defaults and is kept parseable by [`crate::HarnessConfig::from_bytes`].

/// Returns a canonical example `fut.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[validator]
program = "java"
args = ["-jar", "validator/validator_cli.jar"]
artifact = "validator/validator_cli.jar"
fhir_version = "4.0.1"
timeout_ms = 30000

[runner]
workers = 4
global_timeout_ms = 60000

[suite]
tests_dir = "tests"
max_file_bytes = 1048576

[report]
path = "reports/test-report.json"
"#,
    )
}
