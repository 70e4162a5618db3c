// src/processing/filters/mod.rs
//! Table-to-table filters scheduled through the filter pipeline
//!
//! A filter may change the table's shape (decimation, channel selection). Its
//! output shape is authoritative for every later stage; a filter that assumes the
//! original channel count after a reshaping stage is wrong, and the pipeline does
//! not second-guess it.

pub mod basic;
pub mod iir;
pub mod smoothing;

pub use basic::*;
pub use iir::*;
pub use smoothing::*;

use crate::error::EmgResult;
use crate::signal::SignalTable;

/// Pure transformation of a signal table
pub trait SignalFilter: Send + Sync {
    /// Name recorded in the applied-filter history
    fn name(&self) -> &str;

    /// Produce the filtered table; the input is never modified
    fn apply(&self, signal: &SignalTable) -> EmgResult<SignalTable>;
}

impl std::fmt::Debug for dyn SignalFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SignalFilter").field(&self.name()).finish()
    }
}
