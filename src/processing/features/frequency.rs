//! Frequency domain feature extraction for EMG signals

use super::{channel_series, FeatureExtractor, FeatureTable};
use crate::error::{EmgError, EmgResult};
use crate::processing::windowing::{detrend_constant, segment_starts, WindowType};
use crate::signal::SignalTable;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Welch power spectral density estimator
///
/// Segments overlap by half, each is mean-detrended and tapered, and the one-sided
/// density-scaled periodograms are averaged. A signal shorter than the segment
/// length is treated as a single segment.
#[derive(Debug, Clone)]
pub struct Welch {
    sample_rate: f32,
    segment_len: usize,
    window: WindowType,
}

impl Welch {
    pub fn new(sample_rate: f32, segment_len: usize) -> EmgResult<Self> {
        if sample_rate <= 0.0 {
            return Err(EmgError::configuration("sample rate must be greater than zero"));
        }
        if segment_len < 2 {
            return Err(EmgError::configuration("Welch segment length must be at least 2"));
        }
        Ok(Self {
            sample_rate,
            segment_len,
            window: WindowType::Hann,
        })
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    /// Frequencies (Hz) and PSD values of one channel
    pub fn estimate(&self, samples: &[f32]) -> EmgResult<(Vec<f32>, Vec<f32>)> {
        if samples.len() < 2 {
            return Err(EmgError::extraction(
                "welch",
                format!("needs at least 2 samples, got {}", samples.len()),
            ));
        }

        let nperseg = self.segment_len.min(samples.len());
        let hop = nperseg - nperseg / 2;
        let window = self.window.coefficients(nperseg);
        let window_power: f32 = window.iter().map(|w| w * w).sum();
        let scale = 1.0 / (self.sample_rate * window_power);
        let bins = nperseg / 2 + 1;

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(nperseg);

        let starts = segment_starts(samples.len(), nperseg, hop);
        let mut psd = vec![0.0f32; bins];
        let mut buffer = vec![Complex::new(0.0f32, 0.0f32); nperseg];
        for &start in &starts {
            let mut segment = samples[start..start + nperseg].to_vec();
            detrend_constant(&mut segment);
            for ((slot, &x), &w) in buffer.iter_mut().zip(&segment).zip(&window) {
                *slot = Complex::new(x * w, 0.0);
            }
            fft.process(&mut buffer);
            for (k, value) in psd.iter_mut().enumerate() {
                *value += buffer[k].norm_sqr() * scale;
            }
        }

        let segments = starts.len().max(1) as f32;
        let nyquist_bin = (nperseg % 2 == 0).then_some(bins - 1);
        for (k, value) in psd.iter_mut().enumerate() {
            *value /= segments;
            // One-sided: fold negative frequencies, except DC and Nyquist
            if k != 0 && Some(k) != nyquist_bin {
                *value *= 2.0;
            }
        }

        let freqs = (0..bins)
            .map(|k| k as f32 * self.sample_rate / nperseg as f32)
            .collect();
        Ok((freqs, psd))
    }
}

/// Power-weighted average frequency
pub fn mean_frequency(freqs: &[f32], psd: &[f32]) -> f32 {
    let total: f32 = psd.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    freqs.iter().zip(psd).map(|(f, p)| f * p).sum::<f32>() / total
}

/// First frequency at which cumulative power reaches half the total
pub fn median_frequency(freqs: &[f32], psd: &[f32]) -> f32 {
    let total: f32 = psd.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let half = total / 2.0;
    let mut cumulative = 0.0;
    for (f, p) in freqs.iter().zip(psd) {
        cumulative += p;
        if cumulative >= half {
            return *f;
        }
    }
    freqs.last().copied().unwrap_or(0.0)
}

/// Mean and median frequency per channel; one output row per channel
#[derive(Debug, Clone)]
pub struct SpectralExtractor {
    welch: Welch,
}

impl SpectralExtractor {
    pub fn new(welch: Welch) -> Self {
        Self { welch }
    }
}

impl FeatureExtractor for SpectralExtractor {
    fn name(&self) -> &str {
        "spectral"
    }

    fn extract(&self, signal: &SignalTable) -> EmgResult<FeatureTable> {
        let rows = channel_series(self.name(), signal, 2)?
            .iter()
            .map(|data| {
                let (freqs, psd) = self.welch.estimate(data)?;
                Ok(vec![mean_frequency(&freqs, &psd), median_frequency(&freqs, &psd)])
            })
            .collect::<EmgResult<Vec<_>>>()?;
        FeatureTable::from_rows(
            vec!["mean_frequency".to_string(), "median_frequency".to_string()],
            rows,
        )
    }
}

/// Welch PSD table: a `frequency` column followed by one column per channel
#[derive(Debug, Clone)]
pub struct PowerSpectrumExtractor {
    welch: Welch,
}

impl PowerSpectrumExtractor {
    pub fn new(welch: Welch) -> Self {
        Self { welch }
    }
}

impl FeatureExtractor for PowerSpectrumExtractor {
    fn name(&self) -> &str {
        "power-spectrum"
    }

    fn extract(&self, signal: &SignalTable) -> EmgResult<FeatureTable> {
        let channels = channel_series(self.name(), signal, 2)?;
        let mut freqs = Vec::new();
        let mut spectra = Vec::with_capacity(channels.len());
        for data in &channels {
            let (f, psd) = self.welch.estimate(data)?;
            freqs = f;
            spectra.push(psd);
        }

        let rows: Vec<Vec<f32>> = freqs
            .iter()
            .enumerate()
            .map(|(k, &f)| std::iter::once(f).chain(spectra.iter().map(|s| s[k])).collect())
            .collect();
        let columns: Vec<String> = std::iter::once("frequency".to_string())
            .chain((0..channels.len()).map(|ch| format!("ch{}", ch)))
            .collect();
        FeatureTable::from_rows(columns, rows)
    }
}

/// Short-time Fourier transform magnitude of one channel
///
/// Rows are segments in time order, columns are one-sided frequency bins. Each
/// spectrum is scaled by the window sum so a full-scale sinusoid reads ~0.5.
#[derive(Debug, Clone)]
pub struct StftExtractor {
    name: String,
    channel: usize,
    sample_rate: f32,
    segment_len: usize,
    window: WindowType,
}

impl StftExtractor {
    pub fn new(channel: usize, sample_rate: f32, segment_len: usize) -> EmgResult<Self> {
        if sample_rate <= 0.0 || segment_len < 2 {
            return Err(EmgError::configuration(format!(
                "invalid STFT parameters: {} Hz, {} samples per segment",
                sample_rate, segment_len
            )));
        }
        Ok(Self {
            name: format!("stft-ch{}", channel),
            channel,
            sample_rate,
            segment_len,
            window: WindowType::Hann,
        })
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    /// Centre time (seconds) of each output row
    pub fn segment_times(&self, samples: usize) -> Vec<f32> {
        segment_starts(samples, self.segment_len, self.segment_len / 2)
            .into_iter()
            .map(|start| (start + self.segment_len / 2) as f32 / self.sample_rate)
            .collect()
    }
}

impl FeatureExtractor for StftExtractor {
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
        if samples.len() < self.segment_len {
            return Err(EmgError::extraction(
                &self.name,
                format!("segment of {} samples exceeds signal of {}", self.segment_len, samples.len()),
            ));
        }

        let window = self.window.coefficients(self.segment_len);
        let window_sum: f32 = window.iter().sum();
        let bins = self.segment_len / 2 + 1;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(self.segment_len);

        let mut buffer = vec![Complex::new(0.0f32, 0.0f32); self.segment_len];
        let rows: Vec<Vec<f32>> = segment_starts(samples.len(), self.segment_len, self.segment_len / 2)
            .into_iter()
            .map(|start| {
                for ((slot, &x), &w) in buffer
                    .iter_mut()
                    .zip(&samples[start..start + self.segment_len])
                    .zip(&window)
                {
                    *slot = Complex::new(x * w, 0.0);
                }
                fft.process(&mut buffer);
                buffer[..bins].iter().map(|c| c.norm() / window_sum).collect()
            })
            .collect();

        let columns = (0..bins)
            .map(|k| format!("{:.2}Hz", k as f32 * self.sample_rate / self.segment_len as f32))
            .collect();
        FeatureTable::from_rows(columns, rows)
    }
}
