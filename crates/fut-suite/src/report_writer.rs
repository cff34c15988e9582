// crates/fut-suite/src/report_writer.rs
// ============================================================================
// Module: JSON Report Writer
// Description: Persists the run report as pretty-printed JSON.
// Purpose: Provide the file-backed ReportSink used by the CLI.
// Dependencies: fut-core, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`JsonReportWriter`] serializes a [`Report`] and writes it to a fixed path,
//! creating parent directories as needed. Existing files are replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use fut_core::Report;
use fut_core::ReportError;
use fut_core::ReportSink;
use tracing::info;

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Report sink that writes pretty JSON to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonReportWriter {
    /// Destination file.
    path: PathBuf,
}

impl JsonReportWriter {
    /// Creates a writer targeting `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }
}

impl ReportSink for JsonReportWriter {
    fn write_report(&self, report: &Report) -> Result<(), ReportError> {
        let mut bytes =
            serde_json::to_vec_pretty(report).map_err(|err| ReportError::Serialize(err.to_string()))?;
        bytes.push(b'\n');
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| {
                ReportError::Io(format!("{}: {err}", parent.display()))
            })?;
        }
        std::fs::write(&self.path, bytes)
            .map_err(|err| ReportError::Io(format!("{}: {err}", self.path.display())))?;
        info!(path = %self.path.display(), tests = report.total_tests, "report written");
        Ok(())
    }
}
