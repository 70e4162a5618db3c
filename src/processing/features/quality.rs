//! Signal quality features

use super::{channel_series, FeatureExtractor, FeatureTable};
use crate::error::{EmgError, EmgResult};
use crate::signal::SignalTable;

/// Default count of leading samples treated as the noise reference
pub const DEFAULT_NOISE_SAMPLES: usize = 100;

/// Signal-to-noise ratio in dB, one row per channel
///
/// The leading `noise_samples` of each channel are the noise reference and the
/// whole channel is the signal. A silent noise segment yields `+inf`; an all-zero
/// channel yields `NaN`.
#[derive(Debug, Clone)]
pub struct SnrExtractor {
    noise_samples: usize,
}

impl Default for SnrExtractor {
    fn default() -> Self {
        Self {
            noise_samples: DEFAULT_NOISE_SAMPLES,
        }
    }
}

impl SnrExtractor {
    pub fn new(noise_samples: usize) -> EmgResult<Self> {
        if noise_samples == 0 {
            return Err(EmgError::configuration("SNR noise segment must not be empty"));
        }
        Ok(Self { noise_samples })
    }

    pub fn noise_samples(&self) -> usize {
        self.noise_samples
    }
}

fn mean_power(data: &[f32]) -> f32 {
    data.iter().map(|x| x * x).sum::<f32>() / data.len() as f32
}

/// `10 * log10(P_signal / P_noise)`
pub fn snr_db(signal: &[f32], noise: &[f32]) -> f32 {
    10.0 * (mean_power(signal) / mean_power(noise)).log10()
}

impl FeatureExtractor for SnrExtractor {
    fn name(&self) -> &str {
        "snr"
    }

    fn extract(&self, signal: &SignalTable) -> EmgResult<FeatureTable> {
        let values = channel_series(self.name(), signal, self.noise_samples)?
            .iter()
            .map(|data| snr_db(data, &data[..self.noise_samples]))
            .collect();
        Ok(FeatureTable::from_column("snr_db", values))
    }
}
