//! EMG-Signal: streaming buffer and processing engine for multi-channel EMG bands
//!
//! A device link appends sample rows at its own cadence while a consumer reads a
//! consistent, up-to-date table, runs filters over it and extracts features:
//!
//! - Lock-free sample queue with bounded, order-preserving drains
//! - Signal buffer that materializes queued rows lazily, in batches
//! - FIFO filter pipeline with applied-filter history
//! - Feature registry running extractors in parallel against one snapshot
//! - Layered configuration and file-based dataset storage
//!
//! # Quick Start
//!
//! ```rust
//! use emg_signal::processing::features::RowSum;
//! use emg_signal::processing::filters::Passthrough;
//! use emg_signal::SignalSession;
//!
//! fn main() -> Result<(), emg_signal::EmgError> {
//!     let mut session = SignalSession::new(4);
//!     let producer = session.producer();
//!
//!     // Device link side
//!     producer.deliver_row(vec![1.0, 2.0, 3.0, 4.0])?;
//!     producer.deliver_row(vec![5.0, 6.0, 7.0, 8.0])?;
//!
//!     assert_eq!(session.signal()?.rows(), 2);
//!
//!     session.schedule_filter(Passthrough);
//!     session.apply_filters()?;
//!
//!     let sums = session.schedule_feature_extraction(RowSum);
//!     session.extract_features()?;
//!     let table = session.feature(sums).expect("extracted");
//!     assert_eq!(table.to_rows(), vec![vec![10.0], vec![26.0]]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod metadata;
pub mod processing;
pub mod session;
pub mod signal;
pub mod storage;

// Re-export commonly used types for convenience
pub use acquisition::{SampleProducer, SampleQueue, SignalBuffer};
pub use crate::config::{ConfigLoader, EngineConfig};
pub use error::{EmgError, EmgResult};
pub use metadata::{BandMetadata, Metadata, MetadataValue, SubjectMetadata};
pub use processing::{ExtractorId, FeatureExtractor, FeatureRegistry, FeatureTable, FilterPipeline, SignalFilter};
pub use session::{SessionStats, SharedSession, SignalSession};
pub use signal::{SampleRow, SignalTable};
pub use storage::{DatasetStore, FileDatasetStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
