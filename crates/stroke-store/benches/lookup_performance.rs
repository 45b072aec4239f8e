use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stroke_store::{DatasetStore, LoadOptions};

fn sample_dataset(rows: usize) -> String {
    let mut text = String::from("id,gender,age,avg_glucose_level,bmi,smoking_status\n");
    for id in 0..rows {
        let gender = if id % 2 == 0 { "Male" } else { "Female" };
        text.push_str(&format!(
            "{id},{gender},{},{:.2},{},never smoked\n",
            id % 90,
            80.0 + (id % 170) as f64,
            if id % 25 == 0 { "N/A".to_string() } else { format!("{:.1}", 18.0 + (id % 20) as f64) }
        ));
    }
    text
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    for rows in [1_000, 10_000] {
        let text = sample_dataset(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| {
                black_box(DatasetStore::from_reader(text.as_bytes(), &LoadOptions::default()).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let text = sample_dataset(10_000);
    let store = DatasetStore::from_reader(text.as_bytes(), &LoadOptions::default()).unwrap();

    c.bench_function("lookup_hit", |b| {
        b.iter(|| black_box(store.lookup(black_box(4_242))));
    });

    c.bench_function("lookup_miss", |b| {
        b.iter(|| black_box(store.lookup(black_box(99_999))));
    });

    c.bench_function("lookup_and_serialize", |b| {
        b.iter(|| {
            let record = store.lookup(black_box(4_242)).unwrap();
            black_box(serde_json::to_vec(&record).unwrap())
        });
    });
}

criterion_group!(benches, bench_load, bench_lookup);
criterion_main!(benches);
