use metrics::counter;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use super::batch::BatchAccumulator;
use super::diagnostics::{DiagnosticsSink, TracingDiagnostics};
use super::row::{RawRow, BARCODE_COLUMN, NAME_COLUMN, QUANTITY_COLUMN};
use super::upload::StagedUpload;
use super::{ImportOutcome, RejectReason};
use crate::repositories::ProductStore;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Drives one CSV import: parse, validate, then a single bulk insert.
#[derive(Clone)]
pub struct ImportCoordinator {
    store: Arc<dyn ProductStore>,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl ImportCoordinator {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self::with_diagnostics(store, Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(
        store: Arc<dyn ProductStore>,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self { store, diagnostics }
    }

    /// Reads the whole stream into a batch of accepted records.
    ///
    /// Cells are decoded lossily, so a badly encoded row is still validated
    /// on its own. A read failure aborts the run and the partial batch is
    /// dropped.
    pub fn accumulate<R: Read>(
        reader: R,
        sink: &dyn DiagnosticsSink,
    ) -> Result<BatchAccumulator, csv::Error> {
        let reader = skip_utf8_bom(reader)?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.byte_headers()?.clone();
        let missing: Vec<&str> = [BARCODE_COLUMN, NAME_COLUMN, QUANTITY_COLUMN]
            .into_iter()
            .filter(|column| !headers.iter().any(|h| h == column.as_bytes()))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "CSV header is missing required columns");
        }

        let mut batch = BatchAccumulator::new();
        for (idx, result) in csv_reader.byte_records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map_or(idx as u64 + 2, |position| position.line());
            let row = RawRow::from_record(&headers, &record);
            batch.push(line, &row, sink);
        }
        Ok(batch)
    }

    /// Imports from any byte stream
    pub async fn import_reader<R: Read + Send>(&self, reader: R) -> ImportOutcome {
        let parsed = Self::accumulate(reader, self.diagnostics.as_ref());
        self.complete(parsed).await
    }

    /// Imports a staged upload, parsing on the blocking pool. The staged file
    /// is removed whatever the outcome.
    #[instrument(skip(self, upload), fields(path = %upload.path().display(), bytes = upload.size()))]
    pub async fn import_staged(&self, upload: StagedUpload) -> ImportOutcome {
        let sink = Arc::clone(&self.diagnostics);
        let joined = tokio::task::spawn_blocking(move || {
            let parsed = upload
                .open()
                .map_err(csv::Error::from)
                .and_then(|file| Self::accumulate(file, sink.as_ref()));
            (parsed, upload)
        })
        .await;

        match joined {
            Ok((parsed, upload)) => {
                let outcome = self.complete(parsed).await;
                upload.discard();
                outcome
            }
            Err(err) => {
                error!(error = %err, "CSV parsing task failed");
                self.reject(RejectReason::CsvProcessing)
            }
        }
    }

    async fn complete(&self, parsed: Result<BatchAccumulator, csv::Error>) -> ImportOutcome {
        match parsed {
            Ok(batch) => self.commit(batch).await,
            Err(err) => {
                error!(error = %err, "Error processing CSV stream");
                self.reject(RejectReason::CsvProcessing)
            }
        }
    }

    async fn commit(&self, batch: BatchAccumulator) -> ImportOutcome {
        let rows_read = batch.rows_read();
        let rows_skipped = batch.rows_skipped();
        counter!("inventory_import.rows_read", rows_read);
        counter!("inventory_import.rows_skipped", rows_skipped);
        info!(
            rows_read,
            rows_skipped,
            valid_rows = batch.len(),
            "Total valid rows processed: {}",
            batch.len()
        );

        if batch.is_empty() {
            return self.reject(RejectReason::NoValidRows);
        }

        let started = Instant::now();
        match self.store.bulk_insert(batch.into_records()).await {
            Ok(count) => {
                counter!("inventory_import.rows_inserted", count);
                counter!("inventory_import.runs", 1, "outcome" => "accepted");
                info!(
                    inserted = count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "CSV data successfully uploaded"
                );
                ImportOutcome::Accepted { count }
            }
            Err(err) => {
                error!(error = %err, "Database insertion error");
                self.reject(RejectReason::DatabaseInsertion)
            }
        }
    }

    fn reject(&self, reason: RejectReason) -> ImportOutcome {
        counter!("inventory_import.runs", 1, "outcome" => reason.metric_label());
        ImportOutcome::Rejected { reason }
    }
}

fn skip_utf8_bom<R: Read>(reader: R) -> io::Result<BufReader<R>> {
    let mut reader = BufReader::new(reader);
    if reader.fill_buf()?.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }
    Ok(reader)
}
