// crates/fut-suite/src/discovery.rs
// ============================================================================
// Module: Test File Discovery
// Description: Resolves command-line arguments to YAML test files.
// Purpose: Expand wildcards and apply the tests-directory fallback.
// Dependencies: thiserror, tracing
// ============================================================================

//! ## Overview
//! Each argument resolves to zero or more files:
//! - an absolute path that exists is used as-is,
//! - an argument containing `*` is matched against file names in its own
//!   directory (or the tests directory when it names none), sorted,
//! - any other path is tried as given, then under the tests directory.
//!
//! Missing files and files without a `.yml`/`.yaml` extension are logged and
//! skipped. Resolution fails only when nothing usable remains.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use tracing::warn;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving test file arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No argument resolved to a usable test file.
    #[error("no valid test files found in {count} argument(s)")]
    NoTestFiles {
        /// Number of arguments that were inspected.
        count: usize,
    },
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves test file arguments against `tests_dir`.
///
/// # Errors
///
/// Returns [`ResolveError::NoTestFiles`] when no argument yields an existing
/// YAML file.
pub fn resolve_test_files(args: &[String], tests_dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let mut resolved = Vec::new();
    for arg in args {
        for candidate in expand_argument(arg, tests_dir) {
            if !candidate.is_file() {
                warn!(path = %candidate.display(), "test file not found");
                continue;
            }
            if !has_yaml_extension(&candidate) {
                warn!(path = %candidate.display(), "test file is not yaml");
                continue;
            }
            debug!(argument = %arg, path = %candidate.display(), "test file resolved");
            resolved.push(candidate);
        }
    }
    if resolved.is_empty() {
        return Err(ResolveError::NoTestFiles {
            count: args.len(),
        });
    }
    Ok(resolved)
}

/// Expands one argument into candidate paths.
fn expand_argument(arg: &str, tests_dir: &Path) -> Vec<PathBuf> {
    let path = Path::new(arg);
    if path.is_absolute() && path.exists() {
        return vec![path.to_path_buf()];
    }
    if arg.contains('*') {
        return expand_wildcard(path, tests_dir);
    }
    if path.exists() {
        return vec![path.to_path_buf()];
    }
    vec![tests_dir.join(path)]
}

/// Lists files whose names match the wildcard in the final path component.
fn expand_wildcard(pattern: &Path, tests_dir: &Path) -> Vec<PathBuf> {
    let Some(name_pattern) = pattern.file_name().and_then(|name| name.to_str()) else {
        warn!(pattern = %pattern.display(), "unsupported wildcard pattern");
        return Vec::new();
    };
    let dir = match pattern.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => tests_dir.to_path_buf(),
    };
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "cannot list wildcard directory");
            return Vec::new();
        }
    };
    let mut matches: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_str().is_some_and(|name| wildcard_match(name_pattern, name)))
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    if matches.is_empty() {
        warn!(pattern = %pattern.display(), dir = %dir.display(), "wildcard matched no files");
    }
    matches
}

/// Matches `name` against a pattern where `*` spans any run of characters.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return true;
    };
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len() ..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

/// Returns true for `.yml` or `.yaml` extensions, ignoring case.
fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
