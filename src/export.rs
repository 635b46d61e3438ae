//! CSV export of a filtered subset.
//!
//! Output is UTF-8 with a byte-order mark so spreadsheet tools pick the
//! right encoding, and uses the presentation-facing column labels.

use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{
    io_utils::{self, DEFAULT_CSV_DELIMITER},
    pipeline::YearRange,
    query::OUTPUT_COLUMNS,
    record::TransformationRecord,
};

/// File name for an export covering `range`.
pub fn default_file_name(range: YearRange) -> String {
    format!("数字化转型指数_{}-{}.csv", range.min, range.max)
}

pub fn record_cells(record: &TransformationRecord) -> [String; 12] {
    [
        record.stock_code.clone(),
        record.company_name.clone(),
        record.year.to_string(),
        record.industry_code.clone().unwrap_or_default(),
        record.industry_name.clone().unwrap_or_default(),
        record
            .transformation_index
            .map(|value| value.to_string())
            .unwrap_or_default(),
        record.counts.ai.to_string(),
        record.counts.big_data.to_string(),
        record.counts.cloud_computing.to_string(),
        record.counts.blockchain.to_string(),
        record.counts.digital_tech.to_string(),
        record.total_count.to_string(),
    ]
}

pub fn write_rows<W>(sink: W, rows: &[&TransformationRecord]) -> Result<()>
where
    W: Write,
{
    let mut writer = io_utils::open_bom_csv_writer(sink, DEFAULT_CSV_DELIMITER)?;
    writer
        .write_record(OUTPUT_COLUMNS)
        .context("Writing export header")?;
    for record in rows {
        writer
            .write_record(record_cells(record))
            .with_context(|| format!("Writing row ({}, {})", record.stock_code, record.year))?;
    }
    writer.flush().context("Flushing export")?;
    Ok(())
}

pub fn export_rows(path: &Path, rows: &[&TransformationRecord]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("Creating export {path:?}"))?;
    write_rows(std::io::BufWriter::new(file), rows)
        .with_context(|| format!("Exporting to {path:?}"))?;
    info!("Exported {} row(s) to {:?}", rows.len(), path);
    Ok(())
}
