//! Config load validation tests for fut-config.
// crates/fut-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, ranges).
// Purpose: Ensure config input handling is strict and fail-closed.
// Dependencies: fut-config, tempfile
// =============================================================================

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Test helpers are self-describing."
)]

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use fut_config::ConfigError;
use fut_config::HarnessConfig;
use fut_config::config_toml_example;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<HarnessConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(HarnessConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(HarnessConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(HarnessConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(HarnessConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(HarnessConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config("[runner\nworkers = 4")?;
    assert_invalid(HarnessConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_zero_workers() -> TestResult {
    let file = write_config("[runner]\nworkers = 0\n")?;
    assert_invalid(HarnessConfig::load(Some(file.path())), "runner.workers")
}

#[test]
fn load_rejects_tiny_validator_timeout() -> TestResult {
    let file = write_config("[validator]\ntimeout_ms = 5\n")?;
    assert_invalid(HarnessConfig::load(Some(file.path())), "validator.timeout_ms")
}

#[test]
fn load_rejects_empty_program() -> TestResult {
    let file = write_config("[validator]\nprogram = \"  \"\n")?;
    assert_invalid(HarnessConfig::load(Some(file.path())), "validator.program must be non-empty")
}

#[test]
fn load_rejects_oversized_suite_limit() -> TestResult {
    let file = write_config("[suite]\nmax_file_bytes = 999999999\n")?;
    assert_invalid(HarnessConfig::load(Some(file.path())), "suite.max_file_bytes")
}

#[test]
fn partial_sections_keep_defaults() -> TestResult {
    let file = write_config("[runner]\nworkers = 8\n")?;
    let config = HarnessConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.runner.workers != 8 {
        return Err(format!("workers override lost: {}", config.runner.workers));
    }
    if config.runner.global_timeout() != Duration::from_secs(60) {
        return Err("global timeout default changed".to_string());
    }
    if config.validator.timeout() != Duration::from_secs(30) {
        return Err("validator timeout default changed".to_string());
    }
    if config.validator.fhir_version != "4.0.1" {
        return Err("fhir version default changed".to_string());
    }
    Ok(())
}

#[test]
fn example_config_matches_defaults() -> TestResult {
    let parsed = HarnessConfig::from_bytes(config_toml_example().as_bytes())
        .map_err(|err| err.to_string())?;
    if parsed != HarnessConfig::default() {
        return Err("example config drifted from defaults".to_string());
    }
    Ok(())
}
