//! CSV ingestion into the store.
//!
//! The whole source is read into memory first; each record is then mapped
//! and upserted inside one transaction that commits after the last row. A
//! record that fails to decode, map or write is logged and counted as
//! skipped. Only an unreadable source or an unusable store stops the batch.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::{
    error::{ExplorerError, Result},
    io_utils,
    mapper::{self, ColumnLayout},
    store::{ConflictPolicy, Store, TableKind, UpsertOutcome},
};

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub policy: ConflictPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
            policy: ConflictPolicy::Replace,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_skipped: usize,
}

/// A fully buffered source file. Each row carries its 1-based line number
/// (the header is line 1) and either its decoded cells or a read error.
#[derive(Debug)]
pub struct SourceRows {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, std::result::Result<Vec<String>, String>)>,
}

pub fn read_source(path: &Path, options: &IngestOptions) -> Result<SourceRows> {
    if !path.is_file() {
        return Err(ExplorerError::SourceMissing(path.to_path_buf()));
    }
    let source_read = |err: anyhow::Error| ExplorerError::SourceRead {
        path: path.to_path_buf(),
        message: format!("{err:#}"),
    };
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter).map_err(source_read)?;
    let headers = io_utils::reader_headers(&mut reader, options.encoding).map_err(source_read)?;

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let line = row_idx + 2;
        let decoded = match record {
            Ok(record) => io_utils::decode_record(&record, options.encoding)
                .map_err(|err| format!("{err:#}")),
            Err(err) => Err(err.to_string()),
        };
        rows.push((line, decoded));
    }
    Ok(SourceRows { headers, rows })
}

/// Ingests `path` into `table` using an already open store.
pub fn ingest_file(
    store: &mut Store,
    path: &Path,
    table: TableKind,
    options: &IngestOptions,
) -> Result<IngestReport> {
    let source = read_source(path, options)?;
    info!(
        "Read {} row(s) from {:?} for table '{}'",
        source.rows.len(),
        path,
        table.table_name()
    );

    let layout = ColumnLayout::resolve(&source.headers);
    let missing = layout.missing_required(table);
    if !missing.is_empty() {
        let labels = missing.iter().map(|f| f.label()).collect::<Vec<_>>();
        warn!(
            "{:?} has no column(s) {:?}; rows needing them will be skipped",
            path, labels
        );
    }

    let mut report = IngestReport {
        rows_read: source.rows.len(),
        ..IngestReport::default()
    };
    let batch = store.batch(table, options.policy)?;
    for (line, row) in source.rows {
        let row = match row {
            Ok(row) => row,
            Err(message) => {
                error!("Skipping line {line} of {path:?}: {message}");
                report.rows_skipped += 1;
                continue;
            }
        };
        let record = match mapper::map_row(table, &layout, &row) {
            Ok(record) => record,
            Err(reason) => {
                let err = ExplorerError::RowMapping { line, reason };
                error!("Skipping row of {path:?}: {err}");
                report.rows_skipped += 1;
                continue;
            }
        };
        match batch.write(&record) {
            Ok(UpsertOutcome::Written) => report.rows_written += 1,
            Ok(UpsertOutcome::Unchanged) => {
                let (code, year) = record.key();
                debug!("Kept existing row ({code}, {year}) from line {line}");
                report.rows_skipped += 1;
            }
            Err(err) => {
                let (code, year) = record.key();
                error!("Failed to write line {line} ({code}, {year}) of {path:?}: {err}");
                report.rows_skipped += 1;
            }
        }
    }
    batch.commit()?;

    info!(
        "Ingested {:?} into '{}': {} written, {} skipped",
        path,
        table.table_name(),
        report.rows_written,
        report.rows_skipped
    );
    Ok(report)
}

/// Opens the store at `database`, ingests `source`, and releases the
/// connection. Failures are logged and reported as `None`.
pub fn ingest(
    database: &Path,
    source: &Path,
    table: TableKind,
    options: &IngestOptions,
) -> Option<IngestReport> {
    let outcome = Store::open(database).and_then(|mut store| {
        store.ensure_schema()?;
        ingest_file(&mut store, source, table, options)
    });
    match outcome {
        Ok(report) => Some(report),
        Err(err) => {
            error!("Ingestion of {source:?} aborted: {err}");
            None
        }
    }
}
