//! Source-record mapping.
//!
//! Source files carry human-language header labels. A header row is resolved
//! once into a [`ColumnLayout`]; every data row is then coerced into the
//! canonical record for its target table.
//!
//! Coercion rules:
//!
//! - stock code and company name are trimmed and required;
//! - the year falls back to `0` when absent or unparseable, so the row is
//!   kept rather than dropped;
//! - an unparseable index score becomes `None` and is left to the store's
//!   `NOT NULL` constraint;
//! - keyword counts must be non-negative integers;
//! - industry code and name default to `None`.

use crate::{
    error::MappingError,
    record::{KeywordCounts, MappedRecord, TechKeywordRecord, TransformationRecord},
    store::TableKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceField {
    StockCode,
    CompanyName,
    Year,
    IndexScore,
    AiCount,
    BigDataCount,
    CloudComputingCount,
    BlockchainCount,
    DigitalTechCount,
    TotalCount,
    IndustryCode,
    IndustryName,
}

impl SourceField {
    pub const ALL: [SourceField; 12] = [
        SourceField::StockCode,
        SourceField::CompanyName,
        SourceField::Year,
        SourceField::IndexScore,
        SourceField::AiCount,
        SourceField::BigDataCount,
        SourceField::CloudComputingCount,
        SourceField::BlockchainCount,
        SourceField::DigitalTechCount,
        SourceField::TotalCount,
        SourceField::IndustryCode,
        SourceField::IndustryName,
    ];

    /// Header label used in the source files.
    pub fn label(self) -> &'static str {
        match self {
            SourceField::StockCode => "股票代码",
            SourceField::CompanyName => "企业名称",
            SourceField::Year => "年份",
            SourceField::IndexScore => "数字化转型指数(0-100分)",
            SourceField::AiCount => "人工智能词频数",
            SourceField::BigDataCount => "大数据词频数",
            SourceField::CloudComputingCount => "云计算词频数",
            SourceField::BlockchainCount => "区块链词频数",
            SourceField::DigitalTechCount => "数字技术运用词频数",
            SourceField::TotalCount => "总词频数",
            SourceField::IndustryCode => "行业代码",
            SourceField::IndustryName => "行业名称",
        }
    }

    /// Column name in the store.
    pub fn column(self) -> &'static str {
        match self {
            SourceField::StockCode => "stock_code",
            SourceField::CompanyName => "company_name",
            SourceField::Year => "year",
            SourceField::IndexScore => "transformation_index",
            SourceField::AiCount => "ai_count",
            SourceField::BigDataCount => "big_data_count",
            SourceField::CloudComputingCount => "cloud_computing_count",
            SourceField::BlockchainCount => "blockchain_count",
            SourceField::DigitalTechCount => "digital_tech_count",
            SourceField::TotalCount => "total_count",
            SourceField::IndustryCode => "industry_code",
            SourceField::IndustryName => "industry_name",
        }
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// Positions of the known fields within one source file's header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    positions: [Option<usize>; 12],
}

impl ColumnLayout {
    pub fn resolve(headers: &[String]) -> Self {
        let mut positions = [None; 12];
        for (idx, header) in headers.iter().enumerate() {
            let label = header.trim_start_matches('\u{feff}').trim();
            if let Some(field) = SourceField::ALL.iter().find(|f| f.label() == label) {
                let slot = &mut positions[field.ordinal()];
                // first occurrence wins
                if slot.is_none() {
                    *slot = Some(idx);
                }
            }
        }
        Self { positions }
    }

    pub fn has(&self, field: SourceField) -> bool {
        self.positions[field.ordinal()].is_some()
    }

    /// Fields the target table needs that this header row lacks.
    pub fn missing_required(&self, table: TableKind) -> Vec<SourceField> {
        required_fields(table)
            .iter()
            .copied()
            .filter(|field| !self.has(*field))
            .collect()
    }

    /// Trimmed cell for `field`; `None` when the column is absent or blank.
    fn value<'a>(&self, row: &'a [String], field: SourceField) -> Option<&'a str> {
        let idx = self.positions[field.ordinal()]?;
        let trimmed = row.get(idx)?.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

fn required_fields(table: TableKind) -> &'static [SourceField] {
    match table {
        TableKind::Index => &[
            SourceField::StockCode,
            SourceField::CompanyName,
            SourceField::IndexScore,
            SourceField::AiCount,
            SourceField::BigDataCount,
            SourceField::CloudComputingCount,
            SourceField::BlockchainCount,
            SourceField::DigitalTechCount,
            SourceField::TotalCount,
        ],
        TableKind::Keywords => &[
            SourceField::StockCode,
            SourceField::CompanyName,
            SourceField::AiCount,
            SourceField::BigDataCount,
            SourceField::CloudComputingCount,
            SourceField::BlockchainCount,
            SourceField::DigitalTechCount,
        ],
    }
}

pub fn map_row(
    table: TableKind,
    layout: &ColumnLayout,
    row: &[String],
) -> Result<MappedRecord, MappingError> {
    match table {
        TableKind::Index => map_index_row(layout, row).map(MappedRecord::Index),
        TableKind::Keywords => map_keyword_row(layout, row).map(MappedRecord::Keywords),
    }
}

pub fn map_index_row(
    layout: &ColumnLayout,
    row: &[String],
) -> Result<TransformationRecord, MappingError> {
    Ok(TransformationRecord {
        stock_code: required_text(layout, row, SourceField::StockCode)?,
        company_name: required_text(layout, row, SourceField::CompanyName)?,
        year: coerce_year(layout.value(row, SourceField::Year)),
        transformation_index: parse_score(layout.value(row, SourceField::IndexScore)),
        counts: keyword_counts(layout, row)?,
        total_count: count(layout, row, SourceField::TotalCount)?,
        industry_code: optional_text(layout, row, SourceField::IndustryCode),
        industry_name: optional_text(layout, row, SourceField::IndustryName),
    })
}

pub fn map_keyword_row(
    layout: &ColumnLayout,
    row: &[String],
) -> Result<TechKeywordRecord, MappingError> {
    Ok(TechKeywordRecord {
        stock_code: required_text(layout, row, SourceField::StockCode)?,
        company_name: required_text(layout, row, SourceField::CompanyName)?,
        year: coerce_year(layout.value(row, SourceField::Year)),
        counts: keyword_counts(layout, row)?,
    })
}

/// Parses a year, substituting `0` for anything that is not numeric.
pub fn coerce_year(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };
    if let Ok(year) = raw.parse::<i64>() {
        return year;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

fn parse_score(raw: Option<&str>) -> Option<f64> {
    raw?.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn keyword_counts(layout: &ColumnLayout, row: &[String]) -> Result<KeywordCounts, MappingError> {
    Ok(KeywordCounts {
        ai: count(layout, row, SourceField::AiCount)?,
        big_data: count(layout, row, SourceField::BigDataCount)?,
        cloud_computing: count(layout, row, SourceField::CloudComputingCount)?,
        blockchain: count(layout, row, SourceField::BlockchainCount)?,
        digital_tech: count(layout, row, SourceField::DigitalTechCount)?,
    })
}

fn count(layout: &ColumnLayout, row: &[String], field: SourceField) -> Result<i64, MappingError> {
    let raw = layout
        .value(row, field)
        .ok_or(MappingError::MissingField(field.label()))?;
    let value = match raw.parse::<i64>() {
        Ok(value) => value,
        Err(_) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value.fract() == 0.0 => value as i64,
            _ => {
                return Err(MappingError::InvalidNumber {
                    field: field.label(),
                    value: raw.to_string(),
                });
            }
        },
    };
    if value < 0 {
        return Err(MappingError::Negative {
            field: field.label(),
            value,
        });
    }
    Ok(value)
}

fn required_text(
    layout: &ColumnLayout,
    row: &[String],
    field: SourceField,
) -> Result<String, MappingError> {
    layout
        .value(row, field)
        .map(str::to_string)
        .ok_or(MappingError::MissingField(field.label()))
}

fn optional_text(layout: &ColumnLayout, row: &[String], field: SourceField) -> Option<String> {
    layout.value(row, field).map(str::to_string)
}
