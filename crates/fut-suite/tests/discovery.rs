// crates/fut-suite/tests/discovery.rs
// ============================================================================
// Module: Test File Discovery Tests
// Description: Validates argument resolution, wildcards, and filtering.
// Dependencies: fut-suite, tempfile
// ============================================================================
//! ## Overview
//! Builds a temporary tests directory and resolves arguments against it.

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

use std::path::Path;

use fut_suite::ResolveError;
use fut_suite::resolve_test_files;
use tempfile::TempDir;

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ["test-b.yml", "test-a.YAML", "other.yml", "notes.txt"] {
        std::fs::write(dir.path().join(name), "test_id: x\n").unwrap();
    }
    dir
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn absolute_path_is_used_as_is() {
    let dir = fixture();
    let target = dir.path().join("other.yml");
    let resolved =
        resolve_test_files(&args(&[&target.display().to_string()]), Path::new("unused")).unwrap();
    assert_eq!(resolved, vec![target]);
}

#[test]
fn bare_name_falls_back_to_tests_dir() {
    let dir = fixture();
    let resolved = resolve_test_files(&args(&["other.yml"]), dir.path()).unwrap();
    assert_eq!(resolved, vec![dir.path().join("other.yml")]);
}

#[test]
fn wildcard_without_directory_uses_tests_dir_sorted() {
    let dir = fixture();
    let resolved = resolve_test_files(&args(&["test-*"]), dir.path()).unwrap();
    assert_eq!(names(&resolved), vec!["test-a.YAML".to_string(), "test-b.yml".to_string()]);
}

#[test]
fn wildcard_with_directory_uses_that_directory() {
    let dir = fixture();
    let pattern = dir.path().join("*.yml").display().to_string();
    let resolved = resolve_test_files(&args(&[&pattern]), Path::new("unused")).unwrap();
    assert_eq!(names(&resolved), vec!["other.yml".to_string(), "test-b.yml".to_string()]);
}

#[test]
fn non_yaml_and_missing_files_are_skipped() {
    let dir = fixture();
    let resolved =
        resolve_test_files(&args(&["notes.txt", "absent.yml", "other.yml"]), dir.path()).unwrap();
    assert_eq!(names(&resolved), vec!["other.yml".to_string()]);
}

#[test]
fn nothing_usable_is_an_error() {
    let dir = fixture();
    let error = resolve_test_files(&args(&["notes.txt", "absent.yml"]), dir.path()).unwrap_err();
    assert_eq!(
        error,
        ResolveError::NoTestFiles {
            count: 2,
        }
    );
}
