//! Continuous wavelet transform features

use super::{FeatureExtractor, FeatureTable};
use crate::error::{EmgError, EmgResult};
use crate::signal::SignalTable;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Support of the Mexican hat, in units of scale, beyond which it is treated as zero
const SUPPORT: f32 = 8.0;

/// Centre frequency of the Mexican hat wavelet (cycles per sample at scale 1)
const MEXICAN_HAT_CENTER: f32 = 0.25;

/// Mexican hat (Ricker) mother wavelet
pub fn mexican_hat(t: f32) -> f32 {
    let norm = 2.0 / (3.0f32.sqrt() * PI.powf(0.25));
    let t2 = t * t;
    norm * (1.0 - t2) * (-t2 / 2.0).exp()
}

/// Mexican hat CWT of one channel over scales `1..=max_scale`
///
/// Rows are scales in ascending order, columns are sample positions.
#[derive(Debug, Clone)]
pub struct WaveletExtractor {
    name: String,
    channel: usize,
    max_scale: usize,
}

impl WaveletExtractor {
    pub fn new(channel: usize, max_scale: usize) -> EmgResult<Self> {
        if max_scale == 0 {
            return Err(EmgError::configuration("CWT needs at least one scale"));
        }
        Ok(Self {
            name: format!("cwt-ch{}", channel),
            channel,
            max_scale,
        })
    }

    pub fn scales(&self) -> Vec<f32> {
        (1..=self.max_scale).map(|s| s as f32).collect()
    }

    /// Pseudo-frequency (Hz) of each scale at the given sampling rate
    pub fn frequencies(&self, sample_rate: f32) -> Vec<f32> {
        self.scales()
            .into_iter()
            .map(|s| MEXICAN_HAT_CENTER / s * sample_rate)
            .collect()
    }

    fn reach(scale: f32) -> usize {
        (SUPPORT * scale).ceil() as usize
    }
}

/// FFT convolution of one signal with Mexican hats at several scales
///
/// The padded length leaves room for the widest kernel, so the circular
/// convolution equals the zero-padded linear one on every output sample.
struct Convolver {
    len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
}

impl Convolver {
    fn new(samples: &[f32], max_reach: usize) -> Self {
        // Lags past the signal length never reach an output sample
        let reach = max_reach.min(samples.len());
        let len = (samples.len() + reach + 1).next_power_of_two();
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);

        let mut spectrum = vec![Complex::new(0.0, 0.0); len];
        for (bin, &x) in spectrum.iter_mut().zip(samples) {
            bin.re = x;
        }
        forward.process(&mut spectrum);

        Self {
            len,
            forward,
            inverse,
            spectrum,
        }
    }

    fn transform(&self, scale: f32, n: usize) -> Vec<f32> {
        let reach = WaveletExtractor::reach(scale).min(n.saturating_sub(1));
        let mut kernel = vec![Complex::new(0.0, 0.0); self.len];
        kernel[0].re = mexican_hat(0.0);
        for d in 1..=reach {
            // Symmetric wavelet: lag -d wraps to the end of the buffer
            let value = mexican_hat(d as f32 / scale);
            kernel[d].re = value;
            kernel[self.len - d].re = value;
        }
        self.forward.process(&mut kernel);

        for (k, &x) in kernel.iter_mut().zip(&self.spectrum) {
            *k = *k * x;
        }
        self.inverse.process(&mut kernel);

        let norm = 1.0 / (scale.sqrt() * self.len as f32);
        kernel.iter().take(n).map(|c| c.re * norm).collect()
    }
}

impl FeatureExtractor for WaveletExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, signal: &SignalTable) -> EmgResult<FeatureTable> {
        let samples = signal.channel_samples(self.channel).ok_or_else(|| {
            EmgError::extraction(
                &self.name,
                format!("channel {} not present in a {}-channel table", self.channel, signal.channels()),
            )
        })?;
        if samples.is_empty() {
            return Err(EmgError::extraction(&self.name, "signal is empty"));
        }

        let convolver = Convolver::new(&samples, Self::reach(self.max_scale as f32));
        let rows = self
            .scales()
            .into_iter()
            .map(|scale| convolver.transform(scale, samples.len()))
            .collect();
        let columns = (0..samples.len()).map(|i| format!("t{}", i)).collect();
        FeatureTable::from_rows(columns, rows)
    }
}
