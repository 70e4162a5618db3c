// src/processing/windowing.rs
//! Window functions and segmentation for spectral estimation

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Taper applied to each segment before an FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Rectangular,
    Hamming,
    #[default]
    Hann,
    Blackman,
}

impl WindowType {
    /// Periodic window of `size` points (the DFT-even form used for spectral analysis)
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        if size == 0 {
            return Vec::new();
        }
        let n = size as f32;
        match self {
            WindowType::Rectangular => vec![1.0; size],
            WindowType::Hamming => (0..size)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / n).cos())
                .collect(),
            WindowType::Hann => (0..size)
                .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n).cos()))
                .collect(),
            WindowType::Blackman => (0..size)
                .map(|i| {
                    let x = i as f32 / n;
                    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                })
                .collect(),
        }
    }
}

/// Start offsets of every full segment of `segment_len` samples stepped by `hop`
pub fn segment_starts(total: usize, segment_len: usize, hop: usize) -> Vec<usize> {
    if segment_len == 0 || hop == 0 || total < segment_len {
        return Vec::new();
    }
    (0..=total - segment_len).step_by(hop).collect()
}

/// Subtract the mean in place (constant detrend)
pub fn detrend_constant(segment: &mut [f32]) {
    if segment.is_empty() {
        return;
    }
    let mean = segment.iter().sum::<f32>() / segment.len() as f32;
    segment.iter_mut().for_each(|v| *v -= mean);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_functions() {
        let hamming = WindowType::Hamming.coefficients(10);
        assert_eq!(hamming.len(), 10);
        assert!((hamming[0] - 0.08).abs() < 0.01);

        let hann = WindowType::Hann.coefficients(8);
        assert!(hann[0].abs() < 1e-6);
        assert!((hann[4] - 1.0).abs() < 1e-6);

        let rect = WindowType::Rectangular.coefficients(5);
        assert!(rect.iter().all(|&x| x == 1.0));
        assert!(WindowType::Blackman.coefficients(0).is_empty());
    }

    #[test]
    fn test_segment_starts() {
        assert_eq!(segment_starts(10, 4, 2), vec![0, 2, 4, 6]);
        assert_eq!(segment_starts(4, 4, 2), vec![0]);
        assert!(segment_starts(3, 4, 2).is_empty());
        assert!(segment_starts(10, 4, 0).is_empty());
    }

    #[test]
    fn test_detrend() {
        let mut seg = vec![1.0, 2.0, 3.0];
        detrend_constant(&mut seg);
        assert_eq!(seg, vec![-1.0, 0.0, 1.0]);
    }
}
