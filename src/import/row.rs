use csv::ByteRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::diagnostics::{DefaultedField, DiagnosticsSink, ImportDiagnostic, SkipReason};
use crate::models::{normalize_barcode, ProductRecord};

pub const BARCODE_COLUMN: &str = "barcode";
pub const NAME_COLUMN: &str = "name";
pub const QUANTITY_COLUMN: &str = "quantity";
pub const WAREHOUSE_COLUMN: &str = "warehouse";
pub const CONTAINER_CODE_COLUMN: &str = "containerCode";

/// One tokenized CSV data line keyed by header name.
///
/// Cells missing from a short line are absent rather than empty. Bytes that
/// are not valid UTF-8 decode to U+FFFD.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn from_record(headers: &ByteRecord, record: &ByteRecord) -> Self {
        Self(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| {
                    (
                        String::from_utf8_lossy(header).into_owned(),
                        String::from_utf8_lossy(value).into_owned(),
                    )
                })
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Trimmed cell value, `None` when missing or blank
    pub fn present(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for RawRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

/// Result of validating a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowDecision {
    Accepted(ProductRecord),
    Skipped(SkipReason),
}

/// Parses a quantity cell: thousands separators are dropped and the value must
/// be a finite number strictly greater than zero. The whole cell must be
/// numeric; a unit suffix such as `10 pcs` is rejected.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|quantity| quantity.is_finite() && *quantity > 0.0)
}

/// Validates one row against the batch seen so far.
///
/// Checks run in order and stop at the first failure. `seen` only grows when
/// the row passes the field checks, so a rejected row never shadows a later
/// valid one.
pub fn validate_row(
    line: u64,
    row: &RawRow,
    seen: &mut HashSet<String>,
    sink: &dyn DiagnosticsSink,
) -> RowDecision {
    let skip = |reason: SkipReason| {
        sink.record(ImportDiagnostic::RowSkipped {
            line,
            reason: reason.clone(),
            row: row.clone(),
        });
        RowDecision::Skipped(reason)
    };

    let Some(barcode) = row.present(BARCODE_COLUMN) else {
        return skip(SkipReason::MissingBarcode);
    };
    let Some(name) = row.present(NAME_COLUMN) else {
        return skip(SkipReason::MissingName);
    };
    let raw_quantity = row.get(QUANTITY_COLUMN).unwrap_or_default();
    let Some(quantity) = parse_quantity(raw_quantity) else {
        return skip(SkipReason::InvalidQuantity(raw_quantity.to_string()));
    };

    let barcode = normalize_barcode(barcode);
    if seen.contains(&barcode) {
        return skip(SkipReason::DuplicateBarcode(barcode));
    }
    seen.insert(barcode.clone());

    let resolve = |field: DefaultedField| match row.present(field.column()) {
        Some(value) => value.to_string(),
        None => {
            sink.record(ImportDiagnostic::FieldDefaulted {
                line,
                field,
                barcode: barcode.clone(),
            });
            field.default_value().to_string()
        }
    };
    let warehouse = resolve(DefaultedField::Warehouse);
    let container_code = resolve(DefaultedField::ContainerCode);

    RowDecision::Accepted(ProductRecord {
        barcode,
        name: name.to_string(),
        quantity,
        warehouse,
        container_code,
    })
}
