// src/processing/filters/iir.rs
//! Second-order IIR (biquad) filters run forward along each channel

use super::SignalFilter;
use crate::error::{EmgError, EmgResult};
use crate::signal::SignalTable;
use std::f32::consts::PI;

/// Q of a second-order Butterworth section (1/sqrt(2))
pub const BUTTERWORTH_Q: f32 = 0.707;

/// Biquad response shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BiquadKind {
    HighPass,
    LowPass,
    Notch,
}

/// Normalized biquad coefficients (a0 = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Bilinear-transform design for the given response
    pub fn design(kind: BiquadKind, frequency: f32, sample_rate: f32, q: f32) -> EmgResult<Self> {
        if frequency <= 0.0 || frequency >= sample_rate / 2.0 {
            return Err(EmgError::configuration(format!(
                "invalid corner frequency: {} Hz (sample rate: {} Hz)",
                frequency, sample_rate
            )));
        }
        if q <= 0.0 {
            return Err(EmgError::configuration(format!("invalid Q factor: {}", q)));
        }

        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;
        let (b0, b1, b2) = match kind {
            BiquadKind::HighPass => (
                (1.0 + cos_omega) / 2.0,
                -(1.0 + cos_omega),
                (1.0 + cos_omega) / 2.0,
            ),
            BiquadKind::LowPass => (
                (1.0 - cos_omega) / 2.0,
                1.0 - cos_omega,
                (1.0 - cos_omega) / 2.0,
            ),
            BiquadKind::Notch => (1.0, -2.0 * cos_omega, 1.0),
        };

        Ok(Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        })
    }

    /// Direct Form I over one channel, starting from rest
    pub fn run(&self, input: &[f32]) -> Vec<f32> {
        let (mut x1, mut x2, mut y1, mut y2) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
        input
            .iter()
            .map(|&x0| {
                let y0 = self.b0 * x0 + self.b1 * x1 + self.b2 * x2 - self.a1 * y1 - self.a2 * y2;
                x2 = x1;
                x1 = x0;
                y2 = y1;
                y1 = y0;
                y0
            })
            .collect()
    }
}

/// Biquad filter applied independently to every channel
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    name: String,
    coefficients: BiquadCoefficients,
}

impl BiquadFilter {
    /// Butterworth high-pass, removes DC offset and motion artifacts
    pub fn high_pass(cutoff_hz: f32, sample_rate: f32) -> EmgResult<Self> {
        Ok(Self {
            name: format!("highpass-{}Hz", cutoff_hz),
            coefficients: BiquadCoefficients::design(
                BiquadKind::HighPass,
                cutoff_hz,
                sample_rate,
                BUTTERWORTH_Q,
            )?,
        })
    }

    /// Butterworth low-pass
    pub fn low_pass(cutoff_hz: f32, sample_rate: f32) -> EmgResult<Self> {
        Ok(Self {
            name: format!("lowpass-{}Hz", cutoff_hz),
            coefficients: BiquadCoefficients::design(
                BiquadKind::LowPass,
                cutoff_hz,
                sample_rate,
                BUTTERWORTH_Q,
            )?,
        })
    }

    /// Notch for powerline interference
    pub fn notch(center_hz: f32, sample_rate: f32, q: f32) -> EmgResult<Self> {
        Ok(Self {
            name: format!("notch-{}Hz-Q{}", center_hz, q),
            coefficients: BiquadCoefficients::design(BiquadKind::Notch, center_hz, sample_rate, q)?,
        })
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }
}

impl SignalFilter for BiquadFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable> {
        signal.map_channels(|_, samples| Ok(self.coefficients.run(samples)))
    }
}
