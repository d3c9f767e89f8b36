use std::collections::HashSet;

use super::diagnostics::DiagnosticsSink;
use super::row::{validate_row, RawRow, RowDecision};
use crate::models::ProductRecord;

/// Accepted records for one import run, in source order
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    records: Vec<ProductRecord>,
    seen: HashSet<String>,
    rows_read: u64,
    rows_skipped: u64,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `row` and keeps it when accepted
    pub fn push(&mut self, line: u64, row: &RawRow, sink: &dyn DiagnosticsSink) -> bool {
        self.rows_read += 1;
        match validate_row(line, row, &mut self.seen, sink) {
            RowDecision::Accepted(record) => {
                self.records.push(record);
                true
            }
            RowDecision::Skipped(_) => {
                self.rows_skipped += 1;
                false
            }
        }
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }
}
