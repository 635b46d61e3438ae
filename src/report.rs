//! Text rendering of the overview, the filtered table and the aggregates.

use std::fmt::Write as _;

use crate::{
    dataset::Overview,
    pipeline::{FilteredView, IndustryCount, IndustryMean, TrendSeries},
    record::TransformationRecord,
    table::{self, render_table},
};

pub const NO_DATA_MESSAGE: &str = "无法加载数据，请确保数据库已正确初始化。";
pub const NO_MATCH_MESSAGE: &str = "没有符合筛选条件的数据";
pub const TREND_HINT: &str = "请使用 --industry 至少选择一个行业来查看趋势";

pub fn render_overview(overview: &Overview) -> String {
    let span = overview
        .year_span
        .map(|(min, max)| format!("{min}-{max}"))
        .unwrap_or_else(|| "-".to_string());
    let rows = vec![
        vec!["总记录数".to_string(), overview.total_records.to_string()],
        vec!["企业数量".to_string(), overview.distinct_companies.to_string()],
        vec!["行业数量".to_string(), overview.distinct_industries.to_string()],
        vec!["数据年份".to_string(), span],
        vec![
            "行业信息覆盖率".to_string(),
            format!("{:.2}%", overview.industry_coverage),
        ],
    ];
    render_table(&table::headers(["指标", "数值"]), &rows)
}

/// Filtered rows with the display columns; `limit` of zero shows all.
pub fn render_rows(rows: &[&TransformationRecord], limit: usize) -> String {
    let shown = if limit > 0 { limit.min(rows.len()) } else { rows.len() };
    let body = rows[..shown]
        .iter()
        .map(|r| {
            vec![
                r.stock_code.clone(),
                r.company_name.clone(),
                r.year.to_string(),
                r.industry_code.clone().unwrap_or_default(),
                r.industry_name.clone().unwrap_or_default(),
                r.transformation_index
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    let mut output = render_table(
        &table::headers(["股票代码", "企业名称", "年份", "行业代码", "行业名称", "数字化转型指数"]),
        &body,
    );
    if shown < rows.len() {
        let _ = writeln!(output, "... {} more row(s)", rows.len() - shown);
    }
    output
}

pub fn render_distribution(counts: &[IndustryCount]) -> String {
    let rows = counts
        .iter()
        .map(|c| vec![c.industry.clone(), c.companies.to_string()])
        .collect::<Vec<_>>();
    render_table(&table::headers(["行业名称", "企业数量"]), &rows)
}

pub fn render_comparison(means: &[IndustryMean]) -> String {
    let rows = means
        .iter()
        .map(|m| vec![m.industry.clone(), format!("{:.2}", m.mean_index)])
        .collect::<Vec<_>>();
    render_table(&table::headers(["行业名称", "平均数字化转型指数"]), &rows)
}

pub fn render_trend(series: &[TrendSeries]) -> String {
    let rows = series
        .iter()
        .flat_map(|s| {
            s.points
                .iter()
                .map(move |p| {
                    vec![
                        s.industry.clone(),
                        p.year.to_string(),
                        format!("{:.2}", p.mean_index),
                    ]
                })
        })
        .collect::<Vec<_>>();
    render_table(&table::headers(["行业名称", "年份", "平均数字化转型指数"]), &rows)
}

pub fn render_view(view: &FilteredView<'_>, limit: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "筛选后数据量: {} 条记录", view.rows.len());
    if view.is_empty() {
        let _ = writeln!(output, "{NO_MATCH_MESSAGE}");
        return output;
    }
    output.push_str(&render_rows(&view.rows, limit));

    let _ = writeln!(output, "\n各行业企业数量分布 (前20名)");
    output.push_str(&render_distribution(&view.distribution));

    let _ = writeln!(output, "\n各行业平均数字化转型指数对比 (前20名)");
    output.push_str(&render_comparison(&view.comparison));

    let _ = writeln!(output, "\n行业数字化转型指数趋势");
    match &view.trend {
        Some(series) => output.push_str(&render_trend(series)),
        None => {
            let _ = writeln!(output, "{TREND_HINT}");
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::Dataset,
        pipeline::{FilterSpec, apply},
        record::KeywordCounts,
    };

    fn dataset() -> Dataset {
        let record = |code: &str, year: i64, index: f64| TransformationRecord {
            stock_code: code.to_string(),
            company_name: "平安银行".to_string(),
            year,
            transformation_index: Some(index),
            counts: KeywordCounts::default(),
            total_count: 0,
            industry_code: Some("J66".to_string()),
            industry_name: Some("货币金融服务".to_string()),
        };
        Dataset::new(vec![record("000001", 2019, 12.5), record("000001", 2020, 20.0)])
    }

    #[test]
    fn rows_show_index_with_four_decimals() {
        let dataset = dataset();
        let rows = dataset.records().iter().collect::<Vec<_>>();
        let rendered = render_rows(&rows, 1);
        assert!(rendered.contains("12.5000"));
        assert!(!rendered.contains("20.0000"));
        assert!(rendered.contains("... 1 more row(s)"));
    }

    #[test]
    fn view_without_selection_prints_trend_hint() {
        let dataset = dataset();
        let view = apply(&dataset, &FilterSpec::unrestricted(&dataset));
        let rendered = render_view(&view, 0);
        assert!(rendered.contains("筛选后数据量: 2 条记录"));
        assert!(rendered.contains("16.25"));
        assert!(rendered.contains(TREND_HINT));
    }

    #[test]
    fn empty_view_stops_after_message() {
        let dataset = dataset();
        let filter = FilterSpec::unrestricted(&dataset).with_name_substring("万科");
        let rendered = render_view(&apply(&dataset, &filter), 0);
        assert!(rendered.contains(NO_MATCH_MESSAGE));
        assert!(!rendered.contains("各行业企业数量分布"));
    }
}
