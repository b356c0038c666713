use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use serde_json::json;
use tabular_view::{FieldKeyMap, RawRecord, TableEngine};

fn generate_orders(rows: usize) -> Vec<RawRecord> {
    (0..rows)
        .map(|i| {
            let status = match i % 3 {
                0 => "shipped",
                1 => "pending",
                _ => "processing",
            };
            let record = json!({
                "id": i,
                "orderedOn": format!("{:02}/{:02}/20{:02}", i % 28 + 1, i % 12 + 1, i % 25),
                "status": status,
                "customer": {"id": i % 97, "name": format!("customer{:02}", i % 97)},
                "total": (i % 1000) as f64 / 4.0,
            });
            record.as_object().cloned().expect("object")
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let records = generate_orders(20_000);
    let keys: FieldKeyMap = [("customer", "name")].into_iter().collect();
    let mut loaded = TableEngine::new();
    loaded.ingest(&records, &keys).expect("ingest");

    let mut group = c.benchmark_group("pipeline");
    group.bench_function("ingest", |b| {
        b.iter(|| {
            let mut engine = TableEngine::new();
            engine.ingest(&records, &keys).expect("ingest");
            engine.page_count()
        })
    });
    group.bench_function("search_then_sort", |b| {
        b.iter_batched(
            || {
                let mut engine = TableEngine::new();
                engine.ingest(&records, &keys).expect("ingest");
                engine.sort_by("total");
                engine
            },
            |mut engine| engine.search("customer4").len(),
            BatchSize::LargeInput,
        )
    });
    group.bench_function("sort_slash_dates", |b| {
        b.iter(|| {
            loaded.sort_by("orderedOn");
            loaded.page_count()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
