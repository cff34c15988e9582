// crates/fut-suite/src/lib.rs
// ============================================================================
// Module: FUT Suite Library
// Description: File-backed collaborators for the FUT orchestrator.
// Purpose: Load YAML test cases, resolve test files, and write JSON reports.
// Dependencies: fut-core, serde_json, serde_yaml, thiserror, tracing
// ============================================================================

//! ## Overview
//! `fut-suite` implements the file-system side of a harness run:
//! [`YamlTestCaseReader`] parses declarative test descriptions,
//! [`resolve_test_files`] turns command-line arguments into a list of test
//! files, and [`JsonReportWriter`] persists the final report.
//!
//! Security posture: test files are untrusted input; reads are size-bounded
//! and UTF-8 checked before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod discovery;
pub mod reader;
pub mod report_writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use discovery::ResolveError;
pub use discovery::resolve_test_files;
pub use reader::DEFAULT_MAX_FILE_BYTES;
pub use reader::YamlTestCaseReader;
pub use report_writer::JsonReportWriter;
