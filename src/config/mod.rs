// src/config/mod.rs
//! Engine configuration: acquisition, feature extraction and storage settings

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::ConfigLoader;

use crate::error::{EmgError, EmgResult};
use crate::processing::windowing::WindowType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete engine configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Band acquisition settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AcquisitionConfig {
    #[serde(default = "defaults::channel_count")]
    pub channel_count: usize,

    #[serde(default = "defaults::sampling_rate_hz")]
    pub sampling_rate_hz: u32,

    /// Hard bound on queued rows; unbounded when absent
    #[serde(default)]
    pub queue_capacity: Option<usize>,

    /// Reject rows whose length differs from `channel_count` at ingestion
    #[serde(default = "defaults::validate_row_shape")]
    pub validate_row_shape: bool,
}

/// Parameters of the stock feature extractors
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeatureConfig {
    #[serde(default = "defaults::welch_segment_len")]
    pub welch_segment_len: usize,

    /// Taper for Welch and STFT segments
    #[serde(default)]
    pub welch_window: WindowType,

    #[serde(default = "defaults::stft_segment_len")]
    pub stft_segment_len: usize,

    #[serde(default = "defaults::snr_noise_samples")]
    pub snr_noise_samples: usize,

    #[serde(default = "defaults::cwt_max_scale")]
    pub cwt_max_scale: usize,

    #[serde(default = "defaults::zero_crossing_threshold")]
    pub zero_crossing_threshold: f32,
}

/// Dataset store layout
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "defaults::root")]
    pub root: PathBuf,

    /// Data file stem; the extension is fixed by the store
    #[serde(default = "defaults::data_file")]
    pub data_file: String,

    /// Metadata file stem; the extension is fixed by the store
    #[serde(default = "defaults::metadata_file")]
    pub metadata_file: String,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;
    use std::path::PathBuf;

    pub fn channel_count() -> usize { signal::DEFAULT_CHANNEL_COUNT }
    pub fn sampling_rate_hz() -> u32 { signal::DEFAULT_SAMPLING_RATE_HZ }
    pub fn validate_row_shape() -> bool { true }

    pub fn welch_segment_len() -> usize { features::DEFAULT_WELCH_SEGMENT_LEN }
    pub fn stft_segment_len() -> usize { features::DEFAULT_STFT_SEGMENT_LEN }
    pub fn snr_noise_samples() -> usize { features::DEFAULT_SNR_NOISE_SAMPLES }
    pub fn cwt_max_scale() -> usize { features::DEFAULT_CWT_MAX_SCALE }
    pub fn zero_crossing_threshold() -> f32 { features::DEFAULT_ZERO_CROSSING_THRESHOLD }

    pub fn root() -> PathBuf { PathBuf::from(storage::DEFAULT_ROOT) }
    pub fn data_file() -> String { storage::DEFAULT_DATA_FILE.to_string() }
    pub fn metadata_file() -> String { storage::DEFAULT_METADATA_FILE.to_string() }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            channel_count: defaults::channel_count(),
            sampling_rate_hz: defaults::sampling_rate_hz(),
            queue_capacity: None,
            validate_row_shape: defaults::validate_row_shape(),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            welch_segment_len: defaults::welch_segment_len(),
            welch_window: WindowType::default(),
            stft_segment_len: defaults::stft_segment_len(),
            snr_noise_samples: defaults::snr_noise_samples(),
            cwt_max_scale: defaults::cwt_max_scale(),
            zero_crossing_threshold: defaults::zero_crossing_threshold(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: defaults::root(),
            data_file: defaults::data_file(),
            metadata_file: defaults::metadata_file(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration consistency, reporting every problem at once
    pub fn validate(&self) -> EmgResult<()> {
        let mut errors = Vec::new();
        let acq = &self.acquisition;

        if acq.channel_count == 0 || acq.channel_count > signal::MAX_CHANNEL_COUNT {
            errors.push(format!(
                "channel_count must be in 1..={}, got {}",
                signal::MAX_CHANNEL_COUNT,
                acq.channel_count
            ));
        }
        if acq.sampling_rate_hz == 0 {
            errors.push("sampling_rate_hz must be greater than zero".to_string());
        }
        if acq.queue_capacity == Some(0) {
            errors.push("queue_capacity must be greater than zero when set".to_string());
        }

        let feat = &self.features;
        for (name, value) in [
            ("welch_segment_len", feat.welch_segment_len),
            ("stft_segment_len", feat.stft_segment_len),
        ] {
            if value < 2 {
                errors.push(format!("{} must be at least 2, got {}", name, value));
            }
        }
        if feat.snr_noise_samples == 0 {
            errors.push("snr_noise_samples must be greater than zero".to_string());
        }
        if feat.cwt_max_scale == 0 {
            errors.push("cwt_max_scale must be greater than zero".to_string());
        }
        if feat.zero_crossing_threshold < 0.0 {
            errors.push("zero_crossing_threshold must not be negative".to_string());
        }

        if self.storage.data_file.is_empty() || self.storage.metadata_file.is_empty() {
            errors.push("storage file names must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EmgError::configuration(errors.join("; ")))
        }
    }

    /// Sampling rate as used by the spectral extractors
    pub fn sample_rate(&self) -> f32 {
        self.acquisition.sampling_rate_hz as f32
    }
}
