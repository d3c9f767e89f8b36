use std::fmt;
use tracing::{error, warn};

use super::row::{RawRow, CONTAINER_CODE_COLUMN, WAREHOUSE_COLUMN};
use crate::models::{DEFAULT_CONTAINER_CODE, DEFAULT_WAREHOUSE};

/// Why a CSV row was left out of the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingBarcode,
    MissingName,
    /// Raw quantity cell as found in the row
    InvalidQuantity(String),
    /// Normalized barcode already accepted earlier in the batch
    DuplicateBarcode(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingBarcode => write!(f, "missing barcode"),
            SkipReason::MissingName => write!(f, "missing product name"),
            SkipReason::InvalidQuantity(raw) => write!(f, "invalid quantity '{}'", raw),
            SkipReason::DuplicateBarcode(barcode) => write!(f, "duplicate barcode '{}'", barcode),
        }
    }
}

/// Optional column that received its default value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultedField {
    Warehouse,
    ContainerCode,
}

impl DefaultedField {
    pub fn column(self) -> &'static str {
        match self {
            DefaultedField::Warehouse => WAREHOUSE_COLUMN,
            DefaultedField::ContainerCode => CONTAINER_CODE_COLUMN,
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            DefaultedField::Warehouse => DEFAULT_WAREHOUSE,
            DefaultedField::ContainerCode => DEFAULT_CONTAINER_CODE,
        }
    }
}

/// Operator-facing event emitted while validating rows
#[derive(Debug, Clone, PartialEq)]
pub enum ImportDiagnostic {
    RowSkipped {
        line: u64,
        reason: SkipReason,
        row: RawRow,
    },
    FieldDefaulted {
        line: u64,
        field: DefaultedField,
        barcode: String,
    },
}

/// Receives row-level diagnostics; never part of the import result
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, diagnostic: ImportDiagnostic);
}

/// Writes diagnostics as structured tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn record(&self, diagnostic: ImportDiagnostic) {
        match diagnostic {
            ImportDiagnostic::RowSkipped { line, reason, row } => {
                error!(line, reason = %reason, row = %row, "Skipping CSV row");
            }
            ImportDiagnostic::FieldDefaulted {
                line,
                field,
                barcode,
            } => {
                warn!(
                    line,
                    field = field.column(),
                    default = field.default_value(),
                    barcode = %barcode,
                    "Missing field, using default"
                );
            }
        }
    }
}
