// src/signal/table.rs
//! Two-dimensional signal table: rows are acquisition ticks, columns are channels

use crate::error::{EmgError, EmgResult};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// One acquisition tick, one value per channel
pub type SampleRow = Vec<f32>;

/// Time-ordered multi-channel signal backed by an `ndarray` matrix
///
/// The column count is fixed when the table is created. Rows are only ever
/// appended in acquisition order; a filter may replace the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRecord", into = "TableRecord")]
pub struct SignalTable {
    data: Array2<f32>,
}

/// Serialized form: explicit channel count so empty tables keep their shape
#[derive(Serialize, Deserialize)]
struct TableRecord {
    channels: usize,
    rows: Vec<SampleRow>,
}

impl SignalTable {
    /// Empty table with a fixed number of channels
    pub fn new(channels: usize) -> Self {
        Self {
            data: Array2::zeros((0, channels)),
        }
    }

    /// Build a table from rows that must all have `channels` values
    pub fn from_rows(channels: usize, rows: Vec<SampleRow>) -> EmgResult<Self> {
        let mut table = Self::new(channels);
        table.append_rows(rows)?;
        Ok(table)
    }

    /// Wrap an existing matrix (rows x channels)
    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Append a batch of rows after the existing ones in a single concatenation
    ///
    /// Returns the number of appended rows. The batch is rejected as a whole if any
    /// row has the wrong length, leaving the table untouched.
    pub fn append_rows(&mut self, rows: Vec<SampleRow>) -> EmgResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let channels = self.channels();
        let count = rows.len();
        let mut flat = Vec::with_capacity(count * channels);
        for row in rows {
            if row.len() != channels {
                return Err(EmgError::RowShape {
                    expected: channels,
                    actual: row.len(),
                });
            }
            flat.extend(row);
        }

        let batch = Array2::from_shape_vec((count, channels), flat).map_err(|e| {
            EmgError::InvalidTable {
                reason: e.to_string(),
            }
        })?;
        self.data
            .append(Axis(0), batch.view())
            .map_err(|e| EmgError::InvalidTable {
                reason: e.to_string(),
            })?;

        Ok(count)
    }

    /// Number of rows (acquisition ticks)
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of channels (columns)
    pub fn channels(&self) -> usize {
        self.data.ncols()
    }

    /// True when no rows were materialized yet
    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    /// View one row
    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        (index < self.rows()).then(|| self.data.row(index))
    }

    /// View one channel's full time series
    pub fn column(&self, channel: usize) -> Option<ArrayView1<'_, f32>> {
        (channel < self.channels()).then(|| self.data.column(channel))
    }

    /// Copy one channel into a contiguous vector
    pub fn channel_samples(&self, channel: usize) -> Option<Vec<f32>> {
        self.column(channel).map(|c| c.to_vec())
    }

    /// Row-major flattened samples, used by plotting collaborators
    pub fn flatten(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// Rows as owned vectors
    pub fn to_rows(&self) -> Vec<SampleRow> {
        self.data.outer_iter().map(|r| r.to_vec()).collect()
    }

    /// Underlying matrix
    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }

    /// Consume the table and return the matrix
    pub fn into_array(self) -> Array2<f32> {
        self.data
    }

    /// Build a same-shape table by transforming each channel independently
    ///
    /// `f` receives the channel samples in time order and must return a vector of
    /// the same length.
    pub fn map_channels<F>(&self, mut f: F) -> EmgResult<Self>
    where
        F: FnMut(usize, &[f32]) -> EmgResult<Vec<f32>>,
    {
        let mut out = Array2::zeros(self.data.raw_dim());
        for (ch, column) in self.data.columns().into_iter().enumerate() {
            let samples = column.to_vec();
            let transformed = f(ch, &samples)?;
            if transformed.len() != samples.len() {
                return Err(EmgError::InvalidTable {
                    reason: format!(
                        "channel {} transform returned {} samples, expected {}",
                        ch,
                        transformed.len(),
                        samples.len()
                    ),
                });
            }
            out.column_mut(ch).assign(&Array1::from(transformed));
        }
        Ok(Self { data: out })
    }
}

impl From<SignalTable> for TableRecord {
    fn from(table: SignalTable) -> Self {
        TableRecord {
            channels: table.channels(),
            rows: table.to_rows(),
        }
    }
}

impl TryFrom<TableRecord> for SignalTable {
    type Error = EmgError;

    fn try_from(record: TableRecord) -> Result<Self, Self::Error> {
        SignalTable::from_rows(record.channels, record.rows)
    }
}
