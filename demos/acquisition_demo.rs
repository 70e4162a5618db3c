//! Simulated band acquisition: a device thread streams rows while the main thread
//! reads, filters, extracts features and stores the finished dataset.
//!
//! Run with `cargo run --example acquisition_demo`.

use emg_signal::processing::features::{SnrExtractor, SpectralExtractor, TimeDomainExtractor, Welch};
use emg_signal::processing::filters::{BiquadFilter, KalmanSmoother, Offset};
use emg_signal::{DatasetStore, EmgResult, EngineConfig, FileDatasetStore, Metadata, SignalSession};
use rand::Rng;
use std::f32::consts::PI;
use std::thread;
use std::time::Duration;
use tracing::info;

const SECONDS: usize = 4;

fn main() -> EmgResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = EngineConfig::default();
    let channels = config.acquisition.channel_count;
    let rate = config.acquisition.sampling_rate_hz as usize;

    let metadata = Metadata::for_band(channels, rate as u32).with_extra("source", "simulator");
    let mut session = SignalSession::from_config(&config, metadata)?;
    let producer = session.producer();

    // Device link: 500 rows per second around the band's resting baseline
    let device = thread::spawn(move || -> EmgResult<()> {
        let mut rng = rand::thread_rng();
        for tick in 0..SECONDS * rate {
            let t = tick as f32 / rate as f32;
            let activation = if (t % 2.0) > 1.0 { 40.0 } else { 2.0 };
            let row: Vec<f32> = (0..channels)
                .map(|ch| {
                    let hum = 3.0 * (2.0 * PI * 50.0 * t).sin();
                    let emg = activation * rng.gen_range(-1.0f32..1.0) * (1.0 + ch as f32 * 0.1);
                    Offset::BAND_BASELINE + hum + emg
                })
                .collect();
            producer.deliver_row(row)?;
            if tick % 50 == 0 {
                thread::sleep(Duration::from_millis(5));
            }
        }
        Ok(())
    });

    while !device.is_finished() {
        let rows = session.signal()?.rows();
        info!(rows, "consumer read");
        thread::sleep(Duration::from_millis(20));
    }
    device.join().expect("device thread panicked")?;
    info!(rows = session.signal()?.rows(), "acquisition finished");

    let sample_rate = config.sample_rate();
    session.schedule_filter(Offset::band_baseline());
    session.schedule_filter(BiquadFilter::high_pass(20.0, sample_rate)?);
    session.schedule_filter(BiquadFilter::notch(50.0, sample_rate, 30.0)?);
    session.schedule_filter(KalmanSmoother::default());
    session.apply_filters()?;

    let td = session.schedule_feature_extraction(
        TimeDomainExtractor::default().with_threshold(config.features.zero_crossing_threshold),
    );
    let welch = Welch::new(sample_rate, config.features.welch_segment_len)?
        .with_window(config.features.welch_window);
    let spectral = session.schedule_feature_extraction(SpectralExtractor::new(welch));
    let snr = session.schedule_feature_extraction(SnrExtractor::new(config.features.snr_noise_samples)?);
    session.extract_features()?;

    for id in [td, spectral, snr] {
        if let Some(table) = session.feature(id) {
            info!(%id, columns = ?table.columns(), first = ?table.to_rows().first(), "features");
        }
    }

    let dir = tempfile::tempdir()?;
    let store = FileDatasetStore::open(dir.path())?;
    let id = session.persist(&store)?;
    info!(dataset = %id, stored = ?store.list_datasets()?, stats = ?session.stats(), "dataset persisted");
    Ok(())
}
