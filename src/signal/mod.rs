// src/signal/mod.rs
//! Materialized time-series tables

pub mod table;

pub use table::{SampleRow, SignalTable};
