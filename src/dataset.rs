//! The loaded, immutable dataset and its summary figures.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::record::TransformationRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<TransformationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_records: usize,
    pub distinct_companies: usize,
    pub distinct_industries: usize,
    pub year_span: Option<(i64, i64)>,
    /// Percentage of records that carry an industry name.
    pub industry_coverage: f64,
}

impl Dataset {
    pub fn new(records: Vec<TransformationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransformationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Distinct industry names, sorted. Records without one are ignored.
    pub fn industries(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.industry_name.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn overview(&self) -> Overview {
        let total = self.records.len();
        let companies = self
            .records
            .iter()
            .map(|r| r.stock_code.as_str())
            .collect::<HashSet<_>>()
            .len();
        let with_industry = self
            .records
            .iter()
            .filter(|r| r.industry_name.is_some())
            .count();
        let industry_coverage = if total > 0 {
            with_industry as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Overview {
            total_records: total,
            distinct_companies: companies,
            distinct_industries: self.industries().len(),
            year_span: self.year_bounds(),
            industry_coverage,
        }
    }
}
