//! Read path: loads the full index table into memory.

use std::path::Path;

use log::{error, info, warn};

use crate::{dataset::Dataset, error::Result, store::Store};

/// Presentation-facing column labels, in output order.
pub const OUTPUT_COLUMNS: [&str; 12] = [
    "股票代码",
    "企业名称",
    "年份",
    "行业代码",
    "行业名称",
    "数字化转型指数",
    "人工智能词频数",
    "大数据词频数",
    "云计算词频数",
    "区块链词频数",
    "数字技术运用词频数",
    "总词频数",
];

/// Loads every row ordered by stock code, then year.
///
/// Returns `None` after logging when the store cannot be opened, the query
/// fails, or the table is empty. The connection is closed before returning.
pub fn fetch_all(database: &Path) -> Option<Dataset> {
    match load(database) {
        Ok(dataset) if dataset.is_empty() => {
            warn!("No rows found in {database:?}");
            None
        }
        Ok(dataset) => {
            info!("Loaded {} row(s) from {:?}", dataset.len(), database);
            Some(dataset)
        }
        Err(err) => {
            error!("Loading data from {database:?} failed: {err}");
            None
        }
    }
}

fn load(database: &Path) -> Result<Dataset> {
    let store = Store::open_read_only(database)?;
    let records = store.fetch_transformations()?;
    Ok(Dataset::new(records))
}
