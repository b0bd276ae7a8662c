use criterion::{criterion_group, criterion_main, Criterion};
use logframe_convert::reshape::{long_to_wide, ReshapeOptions};
use logframe_convert::response::TableResponse;
use logframe_convert::build_frame;
use logframe_core::types::ColumnDescriptor;
use logframe_core::value::RawRow;

fn sample_response(rows: usize) -> TableResponse {
    let regions = ["us", "eu", "ap"];
    let json: Vec<String> = (0..rows)
        .map(|i| {
            format!(
                r#"["2024-01-01T{:02}:{:02}:00Z", "{}", {}, "{}"]"#,
                (i / 60) % 24,
                i % 60,
                regions[i % regions.len()],
                i,
                i as f64 * 0.5
            )
        })
        .collect();
    let rows: Vec<RawRow> =
        serde_json::from_str(&format!("[{}]", json.join(","))).expect("rows");
    TableResponse::new(
        vec![
            ColumnDescriptor::new("Timestamp", "DateTime"),
            ColumnDescriptor::new("Region", "String"),
            ColumnDescriptor::new("Count", "Int64"),
            ColumnDescriptor::new("Ratio", "Decimal"),
        ],
        rows,
    )
}

fn build_bench(c: &mut Criterion) {
    let response = sample_response(1_000);
    c.bench_function("build_frame_1k", |b| {
        b.iter(|| {
            let _ = build_frame(&response.columns, &response.results).expect("build");
        })
    });
}

fn reshape_bench(c: &mut Criterion) {
    let response = sample_response(1_000);
    let frame = build_frame(&response.columns, &response.results).expect("build");
    let options = ReshapeOptions::default();
    c.bench_function("long_to_wide_1k", |b| {
        b.iter(|| {
            let _ = long_to_wide(&frame, &options).expect("reshape");
        })
    });
}

criterion_group!(convert_benches, build_bench, reshape_bench);
criterion_main!(convert_benches);
