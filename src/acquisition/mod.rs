// src/acquisition/mod.rs
//! Signal acquisition and buffering components

pub mod sample_queue;
pub mod signal_buffer;

pub use sample_queue::*;
pub use signal_buffer::*;
