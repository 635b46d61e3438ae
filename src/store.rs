//! SQLite-backed store for the two firm-year tables.
//!
//! A [`Store`] owns exactly one connection; dropping it closes the
//! connection, so callers scope a store to a single service call.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use rusqlite::{Connection, OpenFlags, Row, Transaction, params};

use crate::{
    error::{ExplorerError, Result},
    record::{KeywordCounts, MappedRecord, TechKeywordRecord, TransformationRecord},
};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS transformation_index (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stock_code TEXT NOT NULL,
    company_name TEXT NOT NULL,
    year INTEGER NOT NULL,
    transformation_index REAL NOT NULL,
    ai_count INTEGER NOT NULL,
    big_data_count INTEGER NOT NULL,
    cloud_computing_count INTEGER NOT NULL,
    blockchain_count INTEGER NOT NULL,
    digital_tech_count INTEGER NOT NULL,
    total_count INTEGER NOT NULL,
    industry_code TEXT,
    industry_name TEXT,
    UNIQUE(stock_code, year)
);

CREATE TABLE IF NOT EXISTS tech_keywords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stock_code TEXT NOT NULL,
    company_name TEXT NOT NULL,
    year INTEGER NOT NULL,
    ai_count INTEGER NOT NULL,
    big_data_count INTEGER NOT NULL,
    cloud_computing_count INTEGER NOT NULL,
    blockchain_count INTEGER NOT NULL,
    digital_tech_count INTEGER NOT NULL,
    UNIQUE(stock_code, year)
);
"#;

const INDEX_COLUMNS: &[&str] = &[
    "stock_code",
    "company_name",
    "year",
    "transformation_index",
    "ai_count",
    "big_data_count",
    "cloud_computing_count",
    "blockchain_count",
    "digital_tech_count",
    "total_count",
    "industry_code",
    "industry_name",
];

const KEYWORD_COLUMNS: &[&str] = &[
    "stock_code",
    "company_name",
    "year",
    "ai_count",
    "big_data_count",
    "cloud_computing_count",
    "blockchain_count",
    "digital_tech_count",
];

const KEY_COLUMNS: &[&str] = &["stock_code", "year"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum TableKind {
    /// Index scores with industry classification
    Index,
    /// Keyword frequency counts
    Keywords,
}

impl TableKind {
    pub fn table_name(self) -> &'static str {
        match self {
            TableKind::Index => "transformation_index",
            TableKind::Keywords => "tech_keywords",
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Index => INDEX_COLUMNS,
            TableKind::Keywords => KEYWORD_COLUMNS,
        }
    }
}

/// What happens when an incoming row shares `(stock_code, year)` with a
/// stored row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Overwrite every non-key field of the stored row
    #[default]
    Replace,
    /// Keep the stored row and drop the incoming one
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Written,
    Unchanged,
}

/// Renders the conflict policy as an `INSERT ... ON CONFLICT` statement.
pub fn upsert_sql(table: TableKind, policy: ConflictPolicy) -> String {
    let columns = table.columns();
    let placeholders = (1..=columns.len())
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    let action = match policy {
        ConflictPolicy::Replace => {
            let assignments = columns
                .iter()
                .filter(|column| !KEY_COLUMNS.contains(*column))
                .map(|column| format!("{column} = excluded.{column}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("DO UPDATE SET {assignments}")
        }
        ConflictPolicy::Skip => "DO NOTHING".to_string(),
    };
    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) ON CONFLICT({keys}) {action}",
        table = table.table_name(),
        columns = columns.join(", "),
        keys = KEY_COLUMNS.join(", "),
    )
}

pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Opens (creating if needed) a read-write store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| ExplorerError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Opens an existing store without write access. A missing file is
    /// reported as unavailable instead of being created.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| {
            ExplorerError::StoreUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|source| ExplorerError::StoreUnavailable {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    pub fn row_count(&self, table: TableKind) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.table_name());
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Starts a write batch. Nothing is persisted until
    /// [`BatchWriter::commit`]; dropping the writer rolls back.
    pub fn batch(&mut self, table: TableKind, policy: ConflictPolicy) -> Result<BatchWriter<'_>> {
        let tx = self.conn.transaction()?;
        Ok(BatchWriter {
            tx,
            sql: upsert_sql(table, policy),
            table,
        })
    }

    /// Every index-table row ordered by stock code, then year.
    pub fn fetch_transformations(&self) -> Result<Vec<TransformationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT stock_code, company_name, year, industry_code, industry_name, \
             transformation_index, ai_count, big_data_count, cloud_computing_count, \
             blockchain_count, digital_tech_count, total_count \
             FROM transformation_index ORDER BY stock_code, year",
        )?;
        let rows = stmt.query_map([], transformation_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn fetch_keywords(&self) -> Result<Vec<TechKeywordRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT stock_code, company_name, year, ai_count, big_data_count, \
             cloud_computing_count, blockchain_count, digital_tech_count \
             FROM tech_keywords ORDER BY stock_code, year",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TechKeywordRecord {
                stock_code: row.get(0)?,
                company_name: row.get(1)?,
                year: row.get(2)?,
                counts: KeywordCounts {
                    ai: row.get(3)?,
                    big_data: row.get(4)?,
                    cloud_computing: row.get(5)?,
                    blockchain: row.get(6)?,
                    digital_tech: row.get(7)?,
                },
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn transformation_from_row(row: &Row<'_>) -> rusqlite::Result<TransformationRecord> {
    Ok(TransformationRecord {
        stock_code: row.get(0)?,
        company_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        year: row.get(2)?,
        industry_code: row.get(3)?,
        industry_name: row.get(4)?,
        transformation_index: row.get(5)?,
        counts: KeywordCounts {
            ai: row.get(6)?,
            big_data: row.get(7)?,
            cloud_computing: row.get(8)?,
            blockchain: row.get(9)?,
            digital_tech: row.get(10)?,
        },
        total_count: row.get(11)?,
    })
}

/// One open transaction writing rows into a single table.
pub struct BatchWriter<'conn> {
    tx: Transaction<'conn>,
    sql: String,
    table: TableKind,
}

impl BatchWriter<'_> {
    pub fn write(&self, record: &MappedRecord) -> rusqlite::Result<UpsertOutcome> {
        let mut stmt = self.tx.prepare_cached(&self.sql)?;
        let changed = match (self.table, record) {
            (TableKind::Index, MappedRecord::Index(r)) => stmt.execute(params![
                r.stock_code,
                r.company_name,
                r.year,
                r.transformation_index,
                r.counts.ai,
                r.counts.big_data,
                r.counts.cloud_computing,
                r.counts.blockchain,
                r.counts.digital_tech,
                r.total_count,
                r.industry_code,
                r.industry_name,
            ])?,
            (TableKind::Keywords, MappedRecord::Keywords(r)) => stmt.execute(params![
                r.stock_code,
                r.company_name,
                r.year,
                r.counts.ai,
                r.counts.big_data,
                r.counts.cloud_computing,
                r.counts.blockchain,
                r.counts.digital_tech,
            ])?,
            _ => return Err(rusqlite::Error::InvalidQuery),
        };
        Ok(if changed > 0 {
            UpsertOutcome::Written
        } else {
            UpsertOutcome::Unchanged
        })
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, year: i64, score: Option<f64>) -> MappedRecord {
        MappedRecord::Index(TransformationRecord {
            stock_code: code.to_string(),
            company_name: format!("Company {code}"),
            year,
            transformation_index: score,
            counts: KeywordCounts::default(),
            total_count: 0,
            industry_code: None,
            industry_name: Some("Finance".to_string()),
        })
    }

    #[test]
    fn replace_sql_updates_every_non_key_column() {
        let sql = upsert_sql(TableKind::Keywords, ConflictPolicy::Replace);
        assert!(sql.starts_with("INSERT INTO tech_keywords (stock_code, company_name, year,"));
        assert!(sql.contains("ON CONFLICT(stock_code, year) DO UPDATE SET"));
        assert!(sql.contains("company_name = excluded.company_name"));
        assert!(sql.contains("digital_tech_count = excluded.digital_tech_count"));
        assert!(!sql.contains("year = excluded.year"));
        assert!(sql.contains("?8"));
        assert!(!sql.contains("?9"));
    }

    #[test]
    fn skip_policy_keeps_existing_row() {
        let mut store = Store::open_in_memory().expect("store");
        store.ensure_schema().expect("schema");
        let batch = store
            .batch(TableKind::Index, ConflictPolicy::Replace)
            .expect("batch");
        batch.write(&record("600000", 2020, Some(45.2))).expect("write");
        batch.commit().expect("commit");

        let batch = store
            .batch(TableKind::Index, ConflictPolicy::Skip)
            .expect("batch");
        let outcome = batch.write(&record("600000", 2020, Some(50.0))).expect("write");
        batch.commit().expect("commit");

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        let rows = store.fetch_transformations().expect("fetch");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transformation_index, Some(45.2));
    }

    #[test]
    fn null_score_violates_not_null_constraint() {
        let mut store = Store::open_in_memory().expect("store");
        store.ensure_schema().expect("schema");
        let batch = store
            .batch(TableKind::Index, ConflictPolicy::Replace)
            .expect("batch");
        assert!(batch.write(&record("600000", 2020, None)).is_err());
        batch.commit().expect("commit");
        assert_eq!(store.row_count(TableKind::Index).expect("count"), 0);
    }

    #[test]
    fn dropped_batch_rolls_back() {
        let mut store = Store::open_in_memory().expect("store");
        store.ensure_schema().expect("schema");
        {
            let batch = store
                .batch(TableKind::Index, ConflictPolicy::Replace)
                .expect("batch");
            batch.write(&record("600000", 2020, Some(1.0))).expect("write");
        }
        assert_eq!(store.row_count(TableKind::Index).expect("count"), 0);
    }

    #[test]
    fn record_for_wrong_table_is_rejected() {
        let mut store = Store::open_in_memory().expect("store");
        store.ensure_schema().expect("schema");
        let batch = store
            .batch(TableKind::Keywords, ConflictPolicy::Replace)
            .expect("batch");
        assert!(batch.write(&record("600000", 2020, Some(1.0))).is_err());
    }
}
