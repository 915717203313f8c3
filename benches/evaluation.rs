//! Benchmarks for window evaluation and report assembly

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sigwatch::device::PULSE_COUNT;
use sigwatch::{
    Classifier, Device, DeviceKind, MetricKind, ReportBuilder, SampleSet, SecondarySignal,
};

fn generate_windows(count: usize) -> Vec<SampleSet> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let base = 1_000 + (i as i64 % 50);
            let values: Vec<Option<i64>> = (0..5)
                .map(|j| {
                    if (i + j) % 13 == 0 {
                        None
                    } else {
                        Some(base + ((i * 7 + j * 3) % 40) as i64)
                    }
                })
                .collect();
            SampleSet::from_integers(&values, now)
        })
        .collect()
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    let windows = generate_windows(1000);
    let classifier = Classifier::new();

    group.throughput(Throughput::Elements(1000));

    group.bench_function("classify_1000_windows", |b| {
        b.iter(|| {
            for window in &windows {
                let result = classifier.classify_window(
                    MetricKind::PulseVariance,
                    window,
                    &SecondarySignal::NotConfigured,
                    false,
                );
                black_box(result);
            }
        })
    });

    group.finish();
}

fn bench_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("reports");

    let windows = generate_windows(1000);
    let classifier = Classifier::new();
    let device = Device::new("ENC-BENCH", "10.0.0.1", DeviceKind::Encoder)
        .with_metric(PULSE_COUNT, "1.3.6.1.4.1.99.1.1");
    let now = Utc::now();

    group.throughput(Throughput::Elements(1000));

    group.bench_function("build_and_serialize_1000_reports", |b| {
        b.iter(|| {
            for window in &windows {
                let (statistic, classification) = classifier.classify_window(
                    MetricKind::PulseVariance,
                    window,
                    &SecondarySignal::NotConfigured,
                    false,
                );
                let report = ReportBuilder::new(&device, now)
                    .windowed(window.clone(), statistic)
                    .build(classification.status);
                black_box(serde_json::to_string(&report).ok());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_classification, bench_reports);
criterion_main!(benches);
