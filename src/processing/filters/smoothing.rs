// src/processing/filters/smoothing.rs
//! Smoothing filters: per-channel Kalman estimate and centred moving average

use super::SignalFilter;
use crate::error::{EmgError, EmgResult};
use crate::signal::SignalTable;

/// Constant-velocity Kalman smoother run independently over each channel
///
/// State is `[amplitude, rate]` with transition `[[1, 1], [0, 1]]`; only the
/// amplitude is observed. The output is the posterior amplitude estimate.
#[derive(Debug, Clone)]
pub struct KalmanSmoother {
    process_noise: f32,
    measurement_noise: f32,
    initial_covariance: f32,
}

impl Default for KalmanSmoother {
    fn default() -> Self {
        Self {
            process_noise: 0.001,
            measurement_noise: 0.1,
            initial_covariance: 1.0,
        }
    }
}

impl KalmanSmoother {
    pub fn new(process_noise: f32, measurement_noise: f32) -> EmgResult<Self> {
        if process_noise < 0.0 || measurement_noise <= 0.0 {
            return Err(EmgError::configuration(format!(
                "invalid Kalman noise: Q={}, R={}",
                process_noise, measurement_noise
            )));
        }
        Ok(Self {
            process_noise,
            measurement_noise,
            ..Self::default()
        })
    }

    fn smooth(&self, observations: &[f32]) -> Vec<f32> {
        let q = self.process_noise;
        let r = self.measurement_noise;
        let mut x = [0.0f32, 0.0f32];
        let mut p = [[self.initial_covariance, 0.0], [0.0, self.initial_covariance]];

        observations
            .iter()
            .map(|&z| {
                // Predict
                x = [x[0] + x[1], x[1]];
                p = [
                    [
                        p[0][0] + p[0][1] + p[1][0] + p[1][1] + q,
                        p[0][1] + p[1][1],
                    ],
                    [p[1][0] + p[1][1], p[1][1] + q],
                ];

                // Update
                let innovation = z - x[0];
                let s = p[0][0] + r;
                let k = [p[0][0] / s, p[1][0] / s];
                x = [x[0] + k[0] * innovation, x[1] + k[1] * innovation];
                p = [
                    [p[0][0] - k[0] * p[0][0], p[0][1] - k[0] * p[0][1]],
                    [p[1][0] - k[1] * p[0][0], p[1][1] - k[1] * p[0][1]],
                ];

                x[0]
            })
            .collect()
    }
}

impl SignalFilter for KalmanSmoother {
    fn name(&self) -> &str {
        "kalman"
    }

    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable> {
        if signal.is_empty() {
            return Err(EmgError::filter(self.name(), "cannot filter an empty table"));
        }
        signal.map_channels(|_, samples| Ok(self.smooth(samples)))
    }
}

/// Centred boxcar average with the same output length as the input
///
/// Samples outside the table count as zero, so the first and last
/// `window / 2` outputs are attenuated.
///
/// The output always has as many rows as the input, including when the
/// window is longer than the table. numpy's `convolve(mode = "same")` would
/// return `window` samples in that case; here the table shape is kept.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    name: String,
    window: usize,
}

impl MovingAverage {
    pub fn new(window: usize) -> EmgResult<Self> {
        if window == 0 {
            return Err(EmgError::configuration("moving average window must be at least 1"));
        }
        if isize::try_from(window).is_err() {
            return Err(EmgError::configuration(format!("moving average window {} is too large", window)));
        }
        Ok(Self {
            name: format!("moving-average-{}", window),
            window,
        })
    }

    fn smooth(&self, samples: &[f32]) -> Vec<f32> {
        let n = samples.len() as isize;
        let w = self.window as isize;
        let lead = (w - 1) / 2;
        let scale = 1.0 / self.window as f32;

        (0..n)
            .map(|i| {
                let hi = i + lead;
                let lo = hi - w + 1;
                let sum: f32 = (lo.max(0)..=hi.min(n - 1))
                    .map(|j| samples[j as usize])
                    .sum();
                sum * scale
            })
            .collect()
    }
}

impl SignalFilter for MovingAverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable> {
        signal.map_channels(|_, samples| Ok(self.smooth(samples)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kalman_converges_on_constant_signal() {
        let rows = (0..500).map(|_| vec![3.0]).collect();
        let table = SignalTable::from_rows(1, rows).unwrap();
        let out = KalmanSmoother::default().apply(&table).unwrap();

        assert_eq!(out.rows(), 500);
        let last = out.row(499).unwrap()[0];
        assert!((last - 3.0).abs() < 0.05, "estimate {}", last);
        // First estimate is pulled toward zero by the prior
        assert!(out.row(0).unwrap()[0] < 3.0);
    }

    #[test]
    fn test_kalman_rejects_empty_table() {
        let err = KalmanSmoother::default().apply(&SignalTable::new(2)).unwrap_err();
        assert!(matches!(err, EmgError::Filter { .. }));
    }

    #[test]
    fn test_kalman_invalid_noise() {
        assert!(KalmanSmoother::new(0.001, 0.0).is_err());
    }

    #[test]
    fn test_moving_average_same_length() {
        let table = SignalTable::from_rows(
            1,
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]],
        )
        .unwrap();
        let out = MovingAverage::new(3).unwrap().apply(&table).unwrap();
        let col = out.channel_samples(0).unwrap();

        let expected = [1.0, 2.0, 3.0, 4.0, 3.0];
        for (got, want) in col.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{:?}", col);
        }
    }

    #[test]
    fn test_moving_average_window_longer_than_signal() {
        let table = SignalTable::from_rows(1, vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let out = MovingAverage::new(5).unwrap().apply(&table).unwrap();

        assert_eq!(out.rows(), 3);
        for got in out.channel_samples(0).unwrap() {
            assert!((got - 1.2).abs() < 1e-6, "{}", got);
        }
        assert!(MovingAverage::new(usize::MAX).is_err());
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let table = SignalTable::from_rows(2, vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(MovingAverage::new(1).unwrap().apply(&table).unwrap(), table);
    }
}
