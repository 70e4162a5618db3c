// src/processing/filters/basic.rs
//! Structural filters: passthrough, baseline offset, decimation, channel selection

use super::SignalFilter;
use crate::error::{EmgError, EmgResult};
use crate::signal::SignalTable;
use ndarray::{Axis, s};

/// Returns the table unchanged
#[derive(Debug, Clone, Default)]
pub struct Passthrough;

impl SignalFilter for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable> {
        Ok(signal.clone())
    }
}

/// Subtracts a constant baseline from every sample
#[derive(Debug, Clone)]
pub struct Offset {
    name: String,
    baseline: f32,
}

impl Offset {
    /// Baseline the band reports for a relaxed muscle
    pub const BAND_BASELINE: f32 = 120.0;

    pub fn new(baseline: f32) -> Self {
        Self {
            name: format!("offset-{}", baseline),
            baseline,
        }
    }

    pub fn band_baseline() -> Self {
        Self::new(Self::BAND_BASELINE)
    }
}

impl SignalFilter for Offset {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable> {
        Ok(SignalTable::from_array(
            signal.as_array().mapv(|v| v - self.baseline),
        ))
    }
}

/// Keeps every `factor`-th row, starting with the first
#[derive(Debug, Clone)]
pub struct Decimate {
    name: String,
    step: isize,
}

impl Decimate {
    pub fn new(factor: usize) -> EmgResult<Self> {
        if factor == 0 {
            return Err(EmgError::configuration("decimation factor must be at least 1"));
        }
        let step = isize::try_from(factor).map_err(|_| {
            EmgError::configuration(format!("decimation factor {} is too large", factor))
        })?;
        Ok(Self {
            name: format!("decimate-{}", factor),
            step,
        })
    }
}

impl SignalFilter for Decimate {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable> {
        Ok(SignalTable::from_array(
            signal.as_array().slice(s![..;self.step, ..]).to_owned(),
        ))
    }
}

/// Keeps a subset of channels, in the given order
#[derive(Debug, Clone)]
pub struct ChannelSelect {
    name: String,
    channels: Vec<usize>,
}

impl ChannelSelect {
    pub fn new(channels: Vec<usize>) -> EmgResult<Self> {
        if channels.is_empty() {
            return Err(EmgError::configuration("channel selection must keep at least one channel"));
        }
        let label = channels
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Ok(Self {
            name: format!("channels-{}", label),
            channels,
        })
    }
}

impl SignalFilter for ChannelSelect {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable> {
        if let Some(&missing) = self.channels.iter().find(|&&c| c >= signal.channels()) {
            return Err(EmgError::filter(
                &self.name,
                format!("channel {} not present in a {}-channel table", missing, signal.channels()),
            ));
        }
        Ok(SignalTable::from_array(
            signal.as_array().select(Axis(1), &self.channels),
        ))
    }
}
