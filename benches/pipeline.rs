use criterion::{Criterion, criterion_group, criterion_main};
use dti_explorer::dataset::Dataset;
use dti_explorer::pipeline::{self, FilterSpec, YearRange};
use dti_explorer::record::{KeywordCounts, TransformationRecord};

const INDUSTRIES: [&str; 8] = [
    "货币金融服务",
    "房地产业",
    "计算机、通信和其他电子设备制造业",
    "软件和信息技术服务业",
    "医药制造业",
    "汽车制造业",
    "零售业",
    "电力、热力生产和供应业",
];

fn generate_dataset(firms: usize) -> Dataset {
    let mut records = Vec::with_capacity(firms * 25);
    for firm in 0..firms {
        for year in 1999..=2023 {
            records.push(TransformationRecord {
                stock_code: format!("{firm:06}"),
                company_name: format!("企业{firm}股份有限公司"),
                year,
                transformation_index: (firm % 17 != 0).then(|| ((firm * 7 + year as usize) % 100) as f64),
                counts: KeywordCounts::default(),
                total_count: 0,
                industry_code: None,
                industry_name: Some(INDUSTRIES[firm % INDUSTRIES.len()].to_string()),
            });
        }
    }
    Dataset::new(records)
}

fn bench_pipeline(c: &mut Criterion) {
    let dataset = generate_dataset(4_000);

    c.bench_function("apply_unrestricted", |b| {
        let filter = FilterSpec::unrestricted(&dataset);
        b.iter(|| pipeline::apply(&dataset, &filter).rows.len());
    });

    c.bench_function("apply_with_trend", |b| {
        let filter = FilterSpec::unrestricted(&dataset)
            .with_year_range(YearRange::new(2010, 2020))
            .with_industries(["货币金融服务", "零售业"])
            .with_name_substring("股份");
        b.iter(|| pipeline::apply(&dataset, &filter).rows.len());
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
