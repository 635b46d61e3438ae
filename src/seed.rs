//! First-run schema creation and seeding.
//!
//! Seeding happens only while the index table is empty. Once it holds data
//! the initializer leaves both tables alone, so repeated calls are cheap and
//! never re-sync from the source files.

use std::path::PathBuf;

use log::{error, info};

use crate::{
    config::Settings,
    error::Result,
    ingest::{self, IngestOptions, IngestReport},
    store::{Store, TableKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSeed {
    pub table: TableKind,
    pub source: PathBuf,
    /// `None` when the source was missing or unreadable.
    pub report: Option<IngestReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadyPopulated { rows: i64 },
    Seeded(Vec<TableSeed>),
    Failed,
}

impl SeedOutcome {
    pub fn is_ok(&self) -> bool {
        !matches!(self, SeedOutcome::Failed)
    }
}

/// Creates both tables if needed and seeds them from the conventional
/// source files when the index table is empty.
pub fn ensure_schema_and_seed(settings: &Settings, options: &IngestOptions) -> SeedOutcome {
    match try_seed(settings, options) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Initializing {:?} failed: {err}", settings.database);
            SeedOutcome::Failed
        }
    }
}

fn try_seed(settings: &Settings, options: &IngestOptions) -> Result<SeedOutcome> {
    let mut store = Store::open(&settings.database)?;
    store.ensure_schema()?;
    info!("Schema ready in {:?}", store.path());

    let rows = store.row_count(TableKind::Index)?;
    if rows > 0 {
        info!(
            "Table '{}' already holds {rows} row(s); skipping seeding",
            TableKind::Index.table_name()
        );
        return Ok(SeedOutcome::AlreadyPopulated { rows });
    }

    info!("Store is empty; seeding from source files");
    let mut seeds = Vec::with_capacity(2);
    for (table, source) in settings.seed_sources() {
        let report = match ingest::ingest_file(&mut store, source, table, options) {
            Ok(report) => Some(report),
            Err(err) => {
                error!("Table '{}' left unseeded: {err}", table.table_name());
                None
            }
        };
        seeds.push(TableSeed {
            table,
            source: source.to_path_buf(),
            report,
        });
    }
    Ok(SeedOutcome::Seeded(seeds))
}
