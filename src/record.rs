//! Canonical record shapes for the two persisted tables.

use serde::Serialize;

/// Per-category keyword frequency counts extracted from an annual report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeywordCounts {
    pub ai: i64,
    pub big_data: i64,
    pub cloud_computing: i64,
    pub blockchain: i64,
    pub digital_tech: i64,
}

impl KeywordCounts {
    pub fn sum(&self) -> i64 {
        self.ai + self.big_data + self.cloud_computing + self.blockchain + self.digital_tech
    }
}

/// One firm-year observation in the `transformation_index` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationRecord {
    pub stock_code: String,
    pub company_name: String,
    pub year: i64,
    /// Nullable in memory; the store rejects a null score at write time.
    pub transformation_index: Option<f64>,
    pub counts: KeywordCounts,
    pub total_count: i64,
    pub industry_code: Option<String>,
    pub industry_name: Option<String>,
}

/// One firm-year observation in the `tech_keywords` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechKeywordRecord {
    pub stock_code: String,
    pub company_name: String,
    pub year: i64,
    pub counts: KeywordCounts,
}

/// A mapped row destined for one of the two tables.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedRecord {
    Index(TransformationRecord),
    Keywords(TechKeywordRecord),
}

impl MappedRecord {
    pub fn key(&self) -> (&str, i64) {
        match self {
            MappedRecord::Index(record) => (record.stock_code.as_str(), record.year),
            MappedRecord::Keywords(record) => (record.stock_code.as_str(), record.year),
        }
    }
}
