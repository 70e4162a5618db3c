//! EMG signal feature extraction
//!
//! Every extractor is a pure `SignalTable -> FeatureTable` transformation:
//! - Time domain features (MAV, RMS, ZC, SSC, WL, variance)
//! - Frequency domain features (Welch PSD, mean and median frequency, STFT)
//! - Time-frequency features (continuous wavelet transform)
//! - Signal quality (SNR against a leading noise segment)
//!
//! Extractors are scheduled into a [`FeatureRegistry`](crate::processing::FeatureRegistry),
//! which runs them independently against one snapshot and caches their output.

pub mod frequency;
pub mod quality;
pub mod time_domain;
pub mod wavelets;

pub use frequency::{PowerSpectrumExtractor, SpectralExtractor, StftExtractor, Welch};
pub use quality::SnrExtractor;
pub use time_domain::{RowSum, TimeDomainExtractor, TimeDomainFeature};
pub use wavelets::WaveletExtractor;

use crate::error::{EmgError, EmgResult};
use crate::signal::SignalTable;
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Pure transformation of a signal table into a derived feature table
pub trait FeatureExtractor: Send + Sync {
    /// Human-readable name, used in logs and name lookups
    fn name(&self) -> &str;

    /// Compute the feature table; the input is never modified
    fn extract(&self, signal: &SignalTable) -> EmgResult<FeatureTable>;
}

impl std::fmt::Debug for dyn FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FeatureExtractor").field(&self.name()).finish()
    }
}

/// Named columns over a dense matrix of feature values
///
/// Shape and meaning of rows are extractor specific: per-channel scalar features
/// use one row per channel, transforms use one row per segment or scale.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Array2<f32>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>, values: Array2<f32>) -> EmgResult<Self> {
        if columns.len() != values.ncols() {
            return Err(EmgError::InvalidTable {
                reason: format!(
                    "{} column names for {} feature columns",
                    columns.len(),
                    values.ncols()
                ),
            });
        }
        Ok(Self { columns, values })
    }

    /// Build from rows of equal length
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f32>>) -> EmgResult<Self> {
        let width = columns.len();
        let height = rows.len();
        let mut flat = Vec::with_capacity(width * height);
        for row in rows {
            if row.len() != width {
                return Err(EmgError::InvalidTable {
                    reason: format!("feature row has {} values, expected {}", row.len(), width),
                });
            }
            flat.extend(row);
        }
        let values = Array2::from_shape_vec((height, width), flat).map_err(|e| {
            EmgError::InvalidTable {
                reason: e.to_string(),
            }
        })?;
        Ok(Self { columns, values })
    }

    /// Single named column
    pub fn from_column(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            columns: vec![name.into()],
            values: Array1::from(values).insert_axis(Axis(1)),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f32>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.values.column(index))
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.values.outer_iter().map(|r| r.to_vec()).collect()
    }
}

/// Channel sample vectors, failing when the table holds fewer than `min_rows` rows
pub(crate) fn channel_series(
    extractor: &str,
    signal: &SignalTable,
    min_rows: usize,
) -> EmgResult<Vec<Vec<f32>>> {
    if signal.rows() < min_rows.max(1) {
        return Err(EmgError::extraction(
            extractor,
            format!("needs at least {} samples, table has {}", min_rows.max(1), signal.rows()),
        ));
    }
    Ok(signal
        .as_array()
        .columns()
        .into_iter()
        .map(|c| c.to_vec())
        .collect())
}
