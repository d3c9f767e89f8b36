//! CSV bulk import of product records.
//!
//! An upload is staged to disk, streamed through the CSV reader, validated row
//! by row into a [`BatchAccumulator`] and committed with one bulk insert. Bad
//! rows are skipped with a diagnostic; only stream errors and store failures
//! reject the whole run.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

pub mod batch;
pub mod coordinator;
pub mod diagnostics;
pub mod row;
pub mod upload;

pub use batch::BatchAccumulator;
pub use coordinator::ImportCoordinator;
pub use diagnostics::{
    DefaultedField, DiagnosticsSink, ImportDiagnostic, SkipReason, TracingDiagnostics,
};
pub use row::{parse_quantity, validate_row, RawRow, RowDecision};
pub use upload::StagedUpload;

/// Why an import run persisted nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NoValidRows,
    DatabaseInsertion,
    CsvProcessing,
}

impl RejectReason {
    /// Message returned to API clients
    pub fn user_message(self) -> &'static str {
        match self {
            RejectReason::NoValidRows => "No valid rows found in the CSV!",
            RejectReason::DatabaseInsertion => "Database insertion error!",
            RejectReason::CsvProcessing => "Error processing CSV file!",
        }
    }

    pub fn metric_label(self) -> &'static str {
        match self {
            RejectReason::NoValidRows => "no_valid_rows",
            RejectReason::DatabaseInsertion => "database_insertion_error",
            RejectReason::CsvProcessing => "csv_processing_error",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectReason::NoValidRows => "no valid rows",
            RejectReason::DatabaseInsertion => "database insertion error",
            RejectReason::CsvProcessing => "csv processing error",
        })
    }
}

/// Result of one import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Accepted { count: u64 },
    Rejected { reason: RejectReason },
}

impl ImportOutcome {
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            ImportOutcome::Accepted { .. } => None,
            ImportOutcome::Rejected { reason } => Some(*reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reasons_render() {
        assert_eq!(RejectReason::NoValidRows.to_string(), "no valid rows");
        assert_eq!(
            RejectReason::DatabaseInsertion.to_string(),
            "database insertion error"
        );
        assert_eq!(RejectReason::CsvProcessing.to_string(), "csv processing error");
        assert_eq!(
            RejectReason::CsvProcessing.user_message(),
            "Error processing CSV file!"
        );
    }

    #[test]
    fn accepted_outcome_has_no_reason() {
        assert_eq!(ImportOutcome::Accepted { count: 3 }.reject_reason(), None);
    }
}
