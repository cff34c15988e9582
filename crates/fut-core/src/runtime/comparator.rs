// crates/fut-core/src/runtime/comparator.rs
// ============================================================================
// Module: FUT Outcome Comparator
// Description: Structural comparison of validator output against expectations.
// Purpose: Compute the discrepancy list for one validator run.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The comparator is a pure, total function over captured output lines and an
//! [`ExpectedResult`]. Matching is exact string equality. Discrepancies are
//! emitted grouped by pass: status, missing errors, missing warnings, missing
//! informations, then unexpected output lines. An empty result means an exact
//! match.
//!
//! Duplicate lines are not collapsed. An expected line satisfied once in the
//! output matches every time it is listed, and each occurrence of an
//! unexpected output line yields its own discrepancy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Discrepancy;
use crate::core::ExpectedResult;
use crate::core::ExpectedStatus;
use crate::core::OutcomeCategory;

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Compares captured validator output against an expectation.
#[must_use]
pub fn compare(actual: &[String], expected: &ExpectedResult) -> Vec<Discrepancy> {
    let mut discrepancies = Vec::new();

    let observed = ExpectedStatus::observed(actual);
    if observed != expected.status {
        discrepancies.push(Discrepancy::StatusMismatch {
            expected: expected.status,
            observed,
        });
    }

    let passes = [
        (OutcomeCategory::Error, &expected.errors),
        (OutcomeCategory::Warning, &expected.warnings),
        (OutcomeCategory::Information, &expected.informations),
    ];
    for (category, lines) in passes {
        for line in lines {
            if !actual.contains(line) {
                discrepancies.push(Discrepancy::Missing {
                    category,
                    line: line.clone(),
                });
            }
        }
    }

    for line in actual {
        if !expected.expects_line(line) {
            discrepancies.push(Discrepancy::Unexpected {
                line: line.clone(),
            });
        }
    }

    discrepancies
}
