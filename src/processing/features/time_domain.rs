//! Time domain feature extraction for EMG signals

use super::{channel_series, FeatureExtractor, FeatureTable};
use crate::error::EmgResult;
use crate::signal::SignalTable;

/// Scalar per-channel time domain features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDomainFeature {
    MeanAbsoluteValue,
    RootMeanSquare,
    ZeroCrossings,
    SlopeSignChanges,
    WaveformLength,
    Variance,
}

impl TimeDomainFeature {
    pub const ALL: [TimeDomainFeature; 6] = [
        TimeDomainFeature::MeanAbsoluteValue,
        TimeDomainFeature::RootMeanSquare,
        TimeDomainFeature::ZeroCrossings,
        TimeDomainFeature::SlopeSignChanges,
        TimeDomainFeature::WaveformLength,
        TimeDomainFeature::Variance,
    ];

    /// Column label in the produced feature table
    pub fn label(&self) -> &'static str {
        match self {
            TimeDomainFeature::MeanAbsoluteValue => "mav",
            TimeDomainFeature::RootMeanSquare => "rms",
            TimeDomainFeature::ZeroCrossings => "zc",
            TimeDomainFeature::SlopeSignChanges => "ssc",
            TimeDomainFeature::WaveformLength => "wl",
            TimeDomainFeature::Variance => "var",
        }
    }
}

/// Time domain feature extractor; one output row per channel
#[derive(Debug, Clone)]
pub struct TimeDomainExtractor {
    name: String,
    features: Vec<TimeDomainFeature>,
    threshold: f32, // Minimum swing for a zero crossing / slope change to count
}

impl Default for TimeDomainExtractor {
    fn default() -> Self {
        Self::new(TimeDomainFeature::ALL.to_vec())
    }
}

impl TimeDomainExtractor {
    pub fn new(features: Vec<TimeDomainFeature>) -> Self {
        let labels = features.iter().map(|f| f.label()).collect::<Vec<_>>().join("+");
        Self {
            name: format!("time-domain[{}]", labels),
            features,
            threshold: 0.0,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    fn compute(&self, feature: TimeDomainFeature, data: &[f32]) -> f32 {
        match feature {
            TimeDomainFeature::MeanAbsoluteValue => calculate_mav(data),
            TimeDomainFeature::RootMeanSquare => calculate_rms(data),
            TimeDomainFeature::ZeroCrossings => self.calculate_zero_crossings(data) as f32,
            TimeDomainFeature::SlopeSignChanges => self.calculate_slope_sign_changes(data) as f32,
            TimeDomainFeature::WaveformLength => calculate_waveform_length(data),
            TimeDomainFeature::Variance => calculate_variance(data),
        }
    }

    /// Consecutive samples whose sign bits differ
    fn calculate_zero_crossings(&self, data: &[f32]) -> u32 {
        data.windows(2)
            .filter(|w| {
                w[0].is_sign_negative() != w[1].is_sign_negative()
                    && (w[1] - w[0]).abs() >= self.threshold
            })
            .count() as u32
    }

    /// Zero crossings of the first difference
    fn calculate_slope_sign_changes(&self, data: &[f32]) -> u32 {
        let slopes: Vec<f32> = data.windows(2).map(|w| w[1] - w[0]).collect();
        self.calculate_zero_crossings(&slopes)
    }
}

impl FeatureExtractor for TimeDomainExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, signal: &SignalTable) -> EmgResult<FeatureTable> {
        let channels = channel_series(&self.name, signal, 1)?;
        let rows = channels
            .iter()
            .map(|data| self.features.iter().map(|&f| self.compute(f, data)).collect())
            .collect();
        let columns = self.features.iter().map(|f| f.label().to_string()).collect();
        FeatureTable::from_rows(columns, rows)
    }
}

/// Sum across channels for every row
#[derive(Debug, Clone, Default)]
pub struct RowSum;

impl FeatureExtractor for RowSum {
    fn name(&self) -> &str {
        "row-sum"
    }

    fn extract(&self, signal: &SignalTable) -> EmgResult<FeatureTable> {
        let sums = signal
            .as_array()
            .outer_iter()
            .map(|row| row.sum())
            .collect();
        Ok(FeatureTable::from_column("sum", sums))
    }
}

fn calculate_mean(data: &[f32]) -> f32 {
    data.iter().sum::<f32>() / data.len() as f32
}

fn calculate_variance(data: &[f32]) -> f32 {
    let mean = calculate_mean(data);
    data.iter().map(|&x| (x - mean).powi(2)).sum::<f32>() / data.len() as f32
}

fn calculate_rms(data: &[f32]) -> f32 {
    let sum_squares: f32 = data.iter().map(|&x| x * x).sum();
    (sum_squares / data.len() as f32).sqrt()
}

fn calculate_mav(data: &[f32]) -> f32 {
    data.iter().map(|&x| x.abs()).sum::<f32>() / data.len() as f32
}

fn calculate_waveform_length(data: &[f32]) -> f32 {
    data.windows(2).map(|w| (w[1] - w[0]).abs()).sum()
}
