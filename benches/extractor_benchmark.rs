//! Extraction throughput of the three level parsers on synthetic listing pages

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use area_code_spider::infrastructure::parsing::{ExtractContext, LevelExtractor, LevelExtractors, SelectorConfig};

fn home_page() -> String {
    let cells: String = (11..=65)
        .map(|code| format!(r#"<td><a href="{code}.html">省份{code}<br></a></td>"#))
        .collect();
    format!(r#"<table class="provincetable"><tr class="provincetr">{cells}</tr></table>"#)
}

fn province_page(rows: usize) -> String {
    let rows: String = (1..=rows)
        .map(|i| {
            format!(
                r#"<tr class="citytr"><td><a href="42/42{i:02}.html">42{i:02}00000000</a></td><td><a href="42/42{i:02}.html">城市{i}</a></td></tr>"#
            )
        })
        .collect();
    format!(r#"<table class="citytable">{rows}</table>"#)
}

fn city_page(rows: usize) -> String {
    let rows: String = (1..=rows)
        .map(|i| {
            if i % 2 == 0 {
                format!(r#"<tr class="countytr"><td>4211{i:02}000000</td><td>区县{i}</td></tr>"#)
            } else {
                format!(
                    r#"<tr class="countytr"><td><a href="11/4211{i:02}.html">4211{i:02}000000</a></td><td><a href="11/4211{i:02}.html">区县{i}</a></td></tr>"#
                )
            }
        })
        .collect();
    format!(r#"<table class="countytable">{rows}</table>"#)
}

fn bench_extractors(c: &mut Criterion) {
    let extractors = LevelExtractors::with_config(&SelectorConfig::default()).expect("default selectors compile");

    let home = home_page();
    let province = province_page(20);
    let city = city_page(40);

    let home_context = ExtractContext::home("index.html");
    let province_context = ExtractContext::child_of("42", "42.html");
    let city_context = ExtractContext::child_of("421100000000", "42/4211.html");

    c.bench_function("province_extract", |b| {
        b.iter(|| extractors.province.extract_html(black_box(&home), &home_context))
    });
    c.bench_function("city_extract", |b| {
        b.iter(|| extractors.city.extract_html(black_box(&province), &province_context))
    });
    c.bench_function("county_extract", |b| {
        b.iter(|| extractors.county.extract_html(black_box(&city), &city_context))
    });
}

criterion_group!(benches, bench_extractors);
criterion_main!(benches);
