//! Filtering and aggregation over the loaded dataset.
//!
//! [`apply`] borrows the dataset, keeps the rows matching every active
//! predicate, and derives three grouped views from that subset:
//!
//! 1. distinct companies per industry (top 20),
//! 2. mean transformation index per industry (top 20),
//! 3. mean index per year for each selected industry.
//!
//! Rows without an industry name take part in the row filter but never form
//! a group.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::{dataset::Dataset, record::TransformationRecord};

pub const TOP_INDUSTRIES: usize = 20;

/// Inclusive year bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

impl YearRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// The dataset's own span, or an unbounded range when it is empty.
    pub fn of(dataset: &Dataset) -> Self {
        dataset
            .year_bounds()
            .map(|(min, max)| Self { min, max })
            .unwrap_or(Self {
                min: i64::MIN,
                max: i64::MAX,
            })
    }

    pub fn contains(&self, year: i64) -> bool {
        self.min <= year && year <= self.max
    }

    /// Intersects optional user bounds with `self`. Bounds that miss the
    /// span entirely leave an inverted range, which contains no year.
    pub fn narrow(&self, from: Option<i64>, to: Option<i64>) -> Self {
        let min = from.map_or(self.min, |from| from.max(self.min));
        let max = to.map_or(self.max, |to| to.min(self.max));
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSpec {
    pub year_range: YearRange,
    /// Selected industries in selection order. Empty means unrestricted.
    pub industries: Vec<String>,
    /// Case-insensitive company name needle. Empty means unrestricted.
    pub name_substring: String,
}

impl FilterSpec {
    pub fn unrestricted(dataset: &Dataset) -> Self {
        Self {
            year_range: YearRange::of(dataset),
            industries: Vec::new(),
            name_substring: String::new(),
        }
    }

    pub fn with_year_range(mut self, year_range: YearRange) -> Self {
        self.year_range = year_range;
        self
    }

    /// Sets the selected industries, dropping blanks and repeats.
    pub fn with_industries<I, S>(mut self, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        self.industries = industries
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                name.trim().to_string()
            })
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .collect();
        self
    }

    pub fn with_name_substring(mut self, needle: impl Into<String>) -> Self {
        self.name_substring = needle.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryCount {
    pub industry: String,
    pub companies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryMean {
    pub industry: String,
    pub mean_index: f64,
    /// Rows with a non-null index that contributed to the mean.
    pub observations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i64,
    pub mean_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub industry: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView<'a> {
    pub filter: FilterSpec,
    pub rows: Vec<&'a TransformationRecord>,
    pub distribution: Vec<IndustryCount>,
    pub comparison: Vec<IndustryMean>,
    /// Present only when at least one industry is selected.
    pub trend: Option<Vec<TrendSeries>>,
}

impl FilteredView<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn apply<'a>(dataset: &'a Dataset, filter: &FilterSpec) -> FilteredView<'a> {
    let rows = filter_rows(dataset.records(), filter);
    let distribution = industry_distribution(&rows);
    let comparison = industry_comparison(&rows);
    let trend = (!filter.industries.is_empty()).then(|| industry_trend(&rows, &filter.industries));
    FilteredView {
        filter: filter.clone(),
        rows,
        distribution,
        comparison,
        trend,
    }
}

pub fn filter_rows<'a>(
    records: &'a [TransformationRecord],
    filter: &FilterSpec,
) -> Vec<&'a TransformationRecord> {
    let industries = filter
        .industries
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>();
    let needle = filter.name_substring.to_lowercase();
    records
        .iter()
        .filter(|r| filter.year_range.contains(r.year))
        .filter(|r| {
            industries.is_empty()
                || r
                    .industry_name
                    .as_deref()
                    .is_some_and(|name| industries.contains(name))
        })
        .filter(|r| needle.is_empty() || r.company_name.to_lowercase().contains(&needle))
        .collect()
}

pub fn industry_distribution(rows: &[&TransformationRecord]) -> Vec<IndustryCount> {
    let mut companies: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in rows {
        if let Some(industry) = row.industry_name.as_deref() {
            companies
                .entry(industry)
                .or_default()
                .insert(row.stock_code.as_str());
        }
    }
    let mut counts = companies
        .into_iter()
        .map(|(industry, codes)| IndustryCount {
            industry: industry.to_string(),
            companies: codes.len(),
        })
        .collect::<Vec<_>>();
    counts.sort_by(|a, b| {
        b.companies
            .cmp(&a.companies)
            .then_with(|| a.industry.cmp(&b.industry))
    });
    counts.truncate(TOP_INDUSTRIES);
    counts
}

#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value.filter(|v| !v.is_nan()) {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

pub fn industry_comparison(rows: &[&TransformationRecord]) -> Vec<IndustryMean> {
    let mut groups: HashMap<&str, MeanAccumulator> = HashMap::new();
    for row in rows {
        if let Some(industry) = row.industry_name.as_deref() {
            groups
                .entry(industry)
                .or_default()
                .add(row.transformation_index);
        }
    }
    let mut means = groups
        .into_iter()
        .filter_map(|(industry, acc)| {
            acc.mean().map(|mean_index| IndustryMean {
                industry: industry.to_string(),
                mean_index,
                observations: acc.count,
            })
        })
        .collect::<Vec<_>>();
    means.sort_by(|a, b| {
        b.mean_index
            .total_cmp(&a.mean_index)
            .then_with(|| a.industry.cmp(&b.industry))
    });
    means.truncate(TOP_INDUSTRIES);
    means
}

/// One series per selected industry, in selection order, with points sorted
/// by year. An industry with no matching rows yields an empty series.
pub fn industry_trend(rows: &[&TransformationRecord], industries: &[String]) -> Vec<TrendSeries> {
    let mut groups: HashMap<&str, BTreeMap<i64, MeanAccumulator>> = industries
        .iter()
        .map(|name| (name.as_str(), BTreeMap::new()))
        .collect();
    for row in rows {
        let Some(industry) = row.industry_name.as_deref() else {
            continue;
        };
        if let Some(years) = groups.get_mut(industry) {
            years.entry(row.year).or_default().add(row.transformation_index);
        }
    }
    industries
        .iter()
        .map(|industry| {
            let points = groups
                .get(industry.as_str())
                .map(|years| {
                    years
                        .iter()
                        .filter_map(|(year, acc)| {
                            acc.mean().map(|mean_index| TrendPoint {
                                year: *year,
                                mean_index,
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            TrendSeries {
                industry: industry.clone(),
                points,
            }
        })
        .collect()
}
