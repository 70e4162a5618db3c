// src/processing/mod.rs
//! Signal processing for buffered EMG data: filter pipeline and feature registry

pub mod features;
pub mod filters;
pub mod pipeline;
pub mod registry;
pub mod windowing;

pub use features::{FeatureExtractor, FeatureTable};
pub use filters::SignalFilter;
pub use pipeline::*;
pub use registry::*;
pub use windowing::*;
