use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emg_signal::acquisition::{SampleQueue, SignalBuffer};
use emg_signal::processing::features::{SpectralExtractor, TimeDomainExtractor, Welch};
use emg_signal::processing::filters::{BiquadFilter, KalmanSmoother};
use emg_signal::SignalSession;

const CHANNEL_COUNTS: &[usize] = &[8, 32, 128];
const BATCH_SIZES: &[usize] = &[64, 512, 4096];

fn benchmark_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingestion");

    for &channels in CHANNEL_COUNTS {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(BenchmarkId::new("enqueue", channels), &channels, |b, &channels| {
            let queue = SampleQueue::unbounded();
            let row = vec![1.0f32; channels];
            b.iter(|| {
                for _ in 0..1000 {
                    queue.enqueue(black_box(row.clone())).unwrap();
                }
                queue.drain_all()
            });
        });
    }

    group.finish();
}

fn benchmark_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");

    for &channels in CHANNEL_COUNTS {
        for &batch in BATCH_SIZES {
            group.throughput(Throughput::Elements(batch as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}ch", channels), batch),
                &(channels, batch),
                |b, &(channels, batch)| {
                    b.iter_batched(
                        || {
                            let buffer = SignalBuffer::new(channels);
                            for i in 0..batch {
                                buffer.add_data_row(vec![i as f32; channels]).unwrap();
                            }
                            buffer
                        },
                        |mut buffer| {
                            black_box(buffer.read().unwrap().rows());
                        },
                        criterion::BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
}

fn benchmark_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("processing");
    let sample_rate = 500.0;

    group.bench_function("filters_8ch_2s", |b| {
        b.iter_batched(
            || {
                let mut session = SignalSession::new(8);
                for i in 0..1000 {
                    session.add_data_row(vec![(i as f32 * 0.3).sin(); 8]).unwrap();
                }
                session.signal().unwrap();
                session.schedule_filter(BiquadFilter::high_pass(20.0, sample_rate).unwrap());
                session.schedule_filter(BiquadFilter::notch(50.0, sample_rate, 30.0).unwrap());
                session.schedule_filter(KalmanSmoother::default());
                session
            },
            |mut session| black_box(session.apply_filters().unwrap()),
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("features_8ch_2s", |b| {
        let mut session = SignalSession::new(8);
        for i in 0..1000 {
            session.add_data_row(vec![(i as f32 * 0.3).sin(); 8]).unwrap();
        }
        session.signal().unwrap();
        session.schedule_feature_extraction(TimeDomainExtractor::default());
        session.schedule_feature_extraction(SpectralExtractor::new(Welch::new(sample_rate, 256).unwrap()));

        b.iter(|| black_box(session.extract_features().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_ingestion, benchmark_sync, benchmark_processing);
criterion_main!(benches);
