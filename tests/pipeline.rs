use std::collections::HashSet;

use proptest::prelude::*;

use dti_explorer::{
    dataset::Dataset,
    pipeline::{FilterSpec, YearRange, apply, filter_rows},
    record::{KeywordCounts, TransformationRecord},
};

const INDUSTRIES: [&str; 4] = ["Finance", "Manufacturing", "Retail", "Mining"];

fn record(
    code: &str,
    name: &str,
    year: i64,
    index: Option<f64>,
    industry: Option<&str>,
) -> TransformationRecord {
    TransformationRecord {
        stock_code: code.to_string(),
        company_name: name.to_string(),
        year,
        transformation_index: index,
        counts: KeywordCounts::default(),
        total_count: 0,
        industry_code: None,
        industry_name: industry.map(str::to_string),
    }
}

/// Firms 0..40 observed every year 1999-2023, industry chosen by firm.
fn spanning_dataset() -> Dataset {
    let mut records = Vec::new();
    for firm in 0..40 {
        let industry = INDUSTRIES[firm % INDUSTRIES.len()];
        for year in 1999..=2023 {
            records.push(record(
                &format!("{firm:06}"),
                &format!("Firm {firm} Holdings"),
                year,
                Some((firm as f64) + (year - 1999) as f64),
                Some(industry),
            ));
        }
    }
    Dataset::new(records)
}

#[test]
fn year_range_without_other_predicates_keeps_all_industries() {
    let dataset = spanning_dataset();
    let filter = FilterSpec::unrestricted(&dataset).with_year_range(YearRange::new(2015, 2020));
    let view = apply(&dataset, &filter);

    assert_eq!(view.rows.len(), 40 * 6);
    assert!(view.rows.iter().all(|r| (2015..=2020).contains(&r.year)));
    let industries = view
        .rows
        .iter()
        .filter_map(|r| r.industry_name.as_deref())
        .collect::<HashSet<_>>();
    assert_eq!(industries.len(), INDUSTRIES.len());
}

#[test]
fn single_industry_selection_yields_one_series_per_year() {
    let dataset = spanning_dataset();
    let filter = FilterSpec::unrestricted(&dataset).with_industries(["Finance"]);
    let view = apply(&dataset, &filter);

    let trend = view.trend.expect("trend present");
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0].industry, "Finance");
    let years = trend[0].points.iter().map(|p| p.year).collect::<Vec<_>>();
    assert_eq!(years, (1999..=2023).collect::<Vec<_>>());
}

#[test]
fn empty_industry_selection_matches_no_industry_filter() {
    let dataset = spanning_dataset();
    let unfiltered = apply(&dataset, &FilterSpec::unrestricted(&dataset));
    let empty_selection = apply(
        &dataset,
        &FilterSpec::unrestricted(&dataset).with_industries(Vec::<String>::new()),
    );
    assert_eq!(unfiltered.rows, empty_selection.rows);
    assert!(empty_selection.trend.is_none());
}

#[test]
fn zero_year_rows_fall_outside_a_realistic_range() {
    let dataset = Dataset::new(vec![
        record("1", "A", 0, Some(1.0), Some("Finance")),
        record("2", "B", 2020, Some(2.0), Some("Finance")),
    ]);
    assert_eq!(YearRange::of(&dataset), YearRange::new(0, 2020));
    let filter = FilterSpec::unrestricted(&dataset).with_year_range(YearRange::new(2015, 2020));
    let rows = filter_rows(dataset.records(), &filter);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].stock_code, "2");
}

#[test]
fn distribution_total_never_exceeds_distinct_companies() {
    let dataset = spanning_dataset();
    let view = apply(&dataset, &FilterSpec::unrestricted(&dataset));
    let total: usize = view.distribution.iter().map(|c| c.companies).sum();
    assert!(total <= dataset.overview().distinct_companies);
    assert_eq!(total, 40);
}

fn record_strategy() -> impl Strategy<Value = TransformationRecord> {
    (
        0u8..20,
        prop_oneof![Just("Alpha Tech"), Just("beta BANK"), Just("Gamma"), Just("")],
        1995i64..2026,
        proptest::option::of(0.0f64..100.0),
        proptest::option::of(prop_oneof![
            Just("Finance"),
            Just("Manufacturing"),
            Just("Retail")
        ]),
    )
        .prop_map(|(code, name, year, index, industry)| {
            record(&format!("{code:06}"), name, year, index, industry)
        })
}

fn filter_strategy() -> impl Strategy<Value = (i64, i64, Vec<&'static str>, &'static str)> {
    (
        1995i64..2026,
        0i64..10,
        proptest::collection::vec(
            prop_oneof![Just("Finance"), Just("Manufacturing"), Just("Retail"), Just("Mining")],
            0..3,
        ),
        prop_oneof![Just(""), Just("bank"), Just("ALPHA"), Just("a")],
    )
        .prop_map(|(start, width, industries, needle)| (start, start + width, industries, needle))
}

proptest! {
    #[test]
    fn filtered_rows_satisfy_every_predicate(
        records in proptest::collection::vec(record_strategy(), 0..60),
        (min, max, industries, needle) in filter_strategy(),
    ) {
        let dataset = Dataset::new(records);
        let filter = FilterSpec::unrestricted(&dataset)
            .with_year_range(YearRange::new(min, max))
            .with_industries(industries.clone())
            .with_name_substring(needle);
        let view = apply(&dataset, &filter);

        let selected = industries.iter().copied().collect::<HashSet<_>>();
        let needle_lower = needle.to_lowercase();
        for row in &view.rows {
            prop_assert!(min <= row.year && row.year <= max);
            if !selected.is_empty() {
                let name = row.industry_name.as_deref().unwrap_or_default();
                prop_assert!(selected.contains(name));
            }
            if !needle.is_empty() {
                prop_assert!(row.company_name.to_lowercase().contains(&needle_lower));
            }
        }

        let expected = dataset
            .records()
            .iter()
            .filter(|r| min <= r.year && r.year <= max)
            .filter(|r| selected.is_empty()
                || r.industry_name.as_deref().is_some_and(|n| selected.contains(n)))
            .filter(|r| needle.is_empty() || r.company_name.to_lowercase().contains(&needle_lower))
            .count();
        prop_assert_eq!(view.rows.len(), expected);
    }

    #[test]
    fn industry_means_ignore_null_scores(
        records in proptest::collection::vec(record_strategy(), 1..60),
    ) {
        let dataset = Dataset::new(records);
        let view = apply(&dataset, &FilterSpec::unrestricted(&dataset));
        for mean in &view.comparison {
            let scores = dataset
                .records()
                .iter()
                .filter(|r| r.industry_name.as_deref() == Some(mean.industry.as_str()))
                .filter_map(|r| r.transformation_index)
                .collect::<Vec<_>>();
            prop_assert_eq!(scores.len(), mean.observations);
            let expected = scores.iter().sum::<f64>() / scores.len() as f64;
            prop_assert!((expected - mean.mean_index).abs() < 1e-9);
        }
    }
}
