// crates/fut-suite/src/reader.rs
// ============================================================================
// Module: YAML Test Case Reader
// Description: Parses declarative YAML test descriptions into test cases.
// Purpose: Provide the file-backed TestCaseReader used by the CLI.
// Dependencies: fut-core, serde_json, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! A test file holds either a single test-case mapping or a sequence of them.
//! Documents are parsed into a generic value tree first, with YAML merge keys
//! (`<<: *anchor`) applied, and then walked field by field, so scalar list
//! entries of any type are accepted and stringified while nulls are dropped.
//!
//! ```yaml
//! - test_id: patient-001
//!   description: Minimal patient
//!   instance_path: instances/patient-001.json
//!   context:
//!     profiles: [http://example.org/StructureDefinition/p]
//!   expected_results:
//!     status: failure
//!     errors: ["ERROR: missing name"]
//! ```
//!
//! Relative instance paths resolve against the directory of the test file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use fut_core::ExpectedResult;
use fut_core::ExpectedStatus;
use fut_core::Invariant;
use fut_core::LoadError;
use fut_core::TestCase;
use fut_core::TestCaseId;
use fut_core::TestCaseReader;
use fut_core::ValidationContext;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum size of a single test file in bytes.
pub const DEFAULT_MAX_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Loads test cases from YAML files with a per-file size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YamlTestCaseReader {
    /// Maximum accepted file size in bytes.
    max_file_bytes: usize,
}

impl Default for YamlTestCaseReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_BYTES)
    }
}

impl YamlTestCaseReader {
    /// Creates a reader that rejects files larger than `max_file_bytes`.
    #[must_use]
    pub const fn new(max_file_bytes: usize) -> Self {
        Self {
            max_file_bytes,
        }
    }
}

impl TestCaseReader for YamlTestCaseReader {
    fn load_test_cases(&self, path: &Path) -> Result<Vec<TestCase>, LoadError> {
        info!(path = %path.display(), "loading test file");
        let bytes = read_file_limited(path, self.max_file_bytes)?;
        let text = std::str::from_utf8(&bytes).map_err(|_| LoadError::Malformed {
            path: path.to_path_buf(),
            message: "file must be utf-8".to_string(),
        })?;
        if text.trim().is_empty() {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }
        let document = parse_document(text).map_err(|message| malformed(path, &message))?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let entries = match document {
            Value::Null => {
                return Err(LoadError::Empty {
                    path: path.to_path_buf(),
                });
            }
            Value::Array(entries) => entries,
            single @ Value::Object(_) => vec![single],
            _ => {
                return Err(malformed(path, "document must be a mapping or a sequence of mappings"));
            }
        };

        let mut test_cases = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let test_case = parse_test_case(entry, base_dir)
                .map_err(|message| malformed(path, &format!("entry {index}: {message}")))?;
            debug!(
                test_id = %test_case.id,
                instance = %test_case.instance_path.display(),
                "test case parsed"
            );
            test_cases.push(test_case);
        }
        Ok(test_cases)
    }
}

// ============================================================================
// SECTION: Document Parsing
// ============================================================================

/// Parses YAML text into a JSON value tree after resolving merge keys.
fn parse_document(text: &str) -> Result<Value, String> {
    let mut document: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|err| err.to_string())?;
    document.apply_merge().map_err(|err| format!("invalid merge key: {err}"))?;
    serde_json::to_value(document).map_err(|err| err.to_string())
}

/// Parses one test-case mapping.
fn parse_test_case(entry: &Value, base_dir: &Path) -> Result<TestCase, String> {
    let map = entry.as_object().ok_or_else(|| "test case must be a mapping".to_string())?;
    let id = map
        .get("test_id")
        .map(|value| scalar_string(value, "test_id"))
        .transpose()?
        .flatten()
        .ok_or_else(|| "missing required field test_id".to_string())?;
    let description =
        map.get("description").map(|value| scalar_string(value, "description")).transpose()?;
    let instance = map
        .get("instance_path")
        .map(|value| scalar_string(value, "instance_path"))
        .transpose()?
        .flatten()
        .unwrap_or_else(|| format!("instances/{id}.json"));

    let context = match optional_mapping(map, "context")? {
        Some(context) => parse_context(context)?,
        None => ValidationContext::default(),
    };
    let expected = parse_expected(optional_mapping(map, "expected_results")?)?;

    Ok(TestCase {
        instance_path: resolve_instance_path(base_dir, &instance),
        id: TestCaseId::new(id),
        description: description.flatten().unwrap_or_default(),
        context,
        expected,
    })
}

/// Parses the validation context mapping.
fn parse_context(map: &Map<String, Value>) -> Result<ValidationContext, String> {
    Ok(ValidationContext {
        igs: string_list(map.get("igs"), "context.igs")?,
        profiles: string_list(map.get("profiles"), "context.profiles")?,
        resources: string_list(map.get("resources"), "context.resources")?,
    })
}

/// Parses the expected-results mapping. The status field is mandatory.
fn parse_expected(map: Option<&Map<String, Value>>) -> Result<ExpectedResult, String> {
    let map = map.ok_or_else(|| "missing expected_results.status".to_string())?;
    let label = map
        .get("status")
        .map(|value| scalar_string(value, "expected_results.status"))
        .transpose()?
        .flatten()
        .ok_or_else(|| "missing expected_results.status".to_string())?;
    let status = ExpectedStatus::parse(label.trim()).ok_or_else(|| {
        format!("expected_results.status must be success or failure, got {label}")
    })?;

    let mut expected = ExpectedResult::new(status);
    expected.errors = string_list(map.get("errors"), "expected_results.errors")?;
    expected.warnings = string_list(map.get("warnings"), "expected_results.warnings")?;
    expected.informations = string_list(map.get("informations"), "expected_results.informations")?;
    expected.invariants = parse_invariants(map.get("invariants"))?;
    Ok(expected)
}

/// Parses invariant entries. Each entry must be a mapping; a missing
/// `expected` defaults to false.
fn parse_invariants(value: Option<&Value>) -> Result<Vec<Invariant>, String> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        _ => return Err("expected_results.invariants must be a sequence".to_string()),
    };
    let mut invariants = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let map = entry
            .as_object()
            .ok_or_else(|| format!("expected_results.invariants[{index}] must be a mapping"))?;
        let expression = map
            .get("expression")
            .map(|value| scalar_string(value, "invariant.expression"))
            .transpose()?
            .flatten()
            .unwrap_or_default();
        let expected = match map.get("expected") {
            Some(Value::Bool(flag)) => *flag,
            Some(other) => scalar_string(other, "invariant.expected")?
                .is_some_and(|text| text.trim().eq_ignore_ascii_case("true")),
            None => {
                debug!(expression = %expression, "invariant without expected value; assuming false");
                false
            }
        };
        invariants.push(Invariant {
            expression,
            expected,
        });
    }
    Ok(invariants)
}

// ============================================================================
// SECTION: Value Helpers
// ============================================================================

/// Returns a nested mapping, treating null as absent.
fn optional_mapping<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(_) => Err(format!("{key} must be a mapping")),
    }
}

/// Stringifies a scalar. Null yields `None`; sequences and mappings are rejected.
fn scalar_string(value: &Value, field: &str) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Array(_) | Value::Object(_) => Err(format!("{field} must be a scalar")),
    }
}

/// Reads a list of scalars as strings, dropping nulls.
fn string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                if let Some(text) = scalar_string(item, field)? {
                    out.push(text);
                }
            }
            Ok(out)
        }
        Some(_) => Err(format!("{field} must be a sequence")),
    }
}

/// Resolves an instance path against the test file directory.
fn resolve_instance_path(base_dir: &Path, instance: &str) -> PathBuf {
    let candidate = Path::new(instance);
    let resolved =
        if candidate.is_absolute() { candidate.to_path_buf() } else { base_dir.join(candidate) };
    if !resolved.exists() {
        warn!(path = %resolved.display(), "instance artifact not found");
    }
    resolved
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Builds a malformed-document error.
fn malformed(path: &Path, message: &str) -> LoadError {
    LoadError::Malformed {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Reads a file while enforcing a maximum byte limit.
fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, LoadError> {
    let unreadable = |message: String| LoadError::Unreadable {
        path: path.to_path_buf(),
        message,
    };
    let metadata = std::fs::metadata(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            unreadable(err.to_string())
        }
    })?;
    if !metadata.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }
    let too_large = |size: u64| LoadError::TooLarge {
        path: path.to_path_buf(),
        size,
        limit: max_bytes,
    };
    let limit = u64::try_from(max_bytes.saturating_add(1))
        .map_err(|_| unreadable("size limit exceeds u64".to_string()))?;
    if metadata.len() >= limit {
        return Err(too_large(metadata.len()));
    }

    let file = File::open(path).map_err(|err| unreadable(err.to_string()))?;
    let mut buf = Vec::new();
    file.take(limit).read_to_end(&mut buf).map_err(|err| unreadable(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(too_large(u64::try_from(buf.len()).unwrap_or(u64::MAX)));
    }
    if buf.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(buf)
}
