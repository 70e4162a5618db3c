// src/session.rs
//! Signal session: one buffer with its metadata, filter pipeline and feature cache

use crate::acquisition::{BufferStats, SampleProducer, SampleQueue, SignalBuffer};
use crate::config::EngineConfig;
use crate::error::{EmgError, EmgResult};
use crate::metadata::Metadata;
use crate::processing::{ExtractorId, FeatureExtractor, FeatureRegistry, FeatureTable, FilterPipeline, SignalFilter};
use crate::signal::{SampleRow, SignalTable};
use crate::storage::DatasetStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Session guarded for use from several threads
///
/// Sync, filtering and extraction all take the same lock, so they never overlap.
/// The device link should hold a [`SampleProducer`] instead, which needs no lock.
pub type SharedSession = Arc<Mutex<SignalSession>>;

/// Session-level counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub buffer: BufferStats,
    pub filters_applied: usize,
    pub filters_pending: usize,
    pub extractors_scheduled: usize,
}

/// Aggregate handed to storage and visualization
///
/// Mutating operations take `&mut self`: a sync, a filter run and an extraction
/// can never interleave on one session.
#[derive(Debug)]
pub struct SignalSession {
    buffer: SignalBuffer,
    metadata: Metadata,
    filters: FilterPipeline,
    features: FeatureRegistry,
}

impl SignalSession {
    /// Empty session for a new acquisition with empty metadata
    pub fn new(channel_count: usize) -> Self {
        Self::assemble(SignalBuffer::new(channel_count), Metadata::default())
    }

    /// Empty session sized by `metadata.band.channels`
    pub fn with_metadata(metadata: Metadata) -> EmgResult<Self> {
        let channels = metadata
            .band
            .channels
            .filter(|&c| c > 0)
            .ok_or_else(|| EmgError::configuration("metadata does not declare a channel count"))?;
        Ok(Self::assemble(SignalBuffer::new(channels), metadata))
    }

    /// Empty session built from engine configuration
    pub fn from_config(config: &EngineConfig, metadata: Metadata) -> EmgResult<Self> {
        config.validate()?;
        let acq = &config.acquisition;
        let queue = SampleQueue::with_capacity(acq.queue_capacity)?;
        let buffer = SignalBuffer::with_queue(acq.channel_count, queue, acq.validate_row_shape);
        Ok(Self::assemble(buffer, metadata))
    }

    /// Session reconstituted from a persisted table and its metadata
    pub fn from_existing(table: SignalTable, metadata: Metadata) -> Self {
        Self::assemble(SignalBuffer::from_table(table), metadata)
    }

    /// Load a stored dataset
    pub fn from_dataset<S: DatasetStore + ?Sized>(store: &S, id: &str) -> EmgResult<Self> {
        let (table, metadata) = store.load(id)?;
        Ok(Self::from_existing(table, metadata))
    }

    fn assemble(buffer: SignalBuffer, metadata: Metadata) -> Self {
        info!(channels = buffer.channels(), "signal session created");
        Self {
            buffer,
            metadata,
            filters: FilterPipeline::new(),
            features: FeatureRegistry::new(),
        }
    }

    /// Wrap for sharing between threads
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Up-to-date signal table; syncs pending rows first
    pub fn signal(&mut self) -> EmgResult<&SignalTable> {
        self.buffer.read()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Enqueue one sample row without touching the table
    pub fn add_data_row(&self, row: impl Into<SampleRow>) -> EmgResult<()> {
        self.buffer.add_data_row(row)
    }

    /// Handle for the device link callback
    pub fn producer(&self) -> SampleProducer {
        self.buffer.producer()
    }

    pub fn is_outdated(&self) -> bool {
        self.buffer.is_outdated()
    }

    pub fn schedule_filter<F: SignalFilter + 'static>(&mut self, filter: F) {
        self.filters.schedule(Box::new(filter));
    }

    /// Apply every scheduled filter in order; see [`FilterPipeline::apply_all`]
    pub fn apply_filters(&mut self) -> EmgResult<usize> {
        self.filters.apply_all(&mut self.buffer)
    }

    pub fn schedule_feature_extraction<E: FeatureExtractor + 'static>(&mut self, extractor: E) -> ExtractorId {
        self.features.schedule(Box::new(extractor))
    }

    /// Run every scheduled extractor; see [`FeatureRegistry::extract_all`]
    pub fn extract_features(&mut self) -> EmgResult<usize> {
        self.features.extract_all(&self.buffer)
    }

    /// Registry with the cached feature tables
    pub fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut FeatureRegistry {
        &mut self.features
    }

    /// Cached output of one extractor
    pub fn feature(&self, id: ExtractorId) -> Option<&FeatureTable> {
        self.features.get(id)
    }

    pub fn applied_filters(&self) -> Vec<&str> {
        self.filters.applied()
    }

    pub fn pending_filters(&self) -> Vec<&str> {
        self.filters.pending()
    }

    /// Row-major sample sequence of the up-to-date table, for plotting
    pub fn flattened_signal(&mut self) -> EmgResult<Vec<f32>> {
        Ok(self.signal()?.flatten())
    }

    /// Rows kept aside after a sync could not merge them
    pub fn take_unmerged(&mut self) -> Vec<SampleRow> {
        self.buffer.take_unmerged()
    }

    /// Sync, then hand the table and metadata off by value
    pub fn into_parts(mut self) -> EmgResult<(SignalTable, Metadata)> {
        self.buffer.read()?;
        Ok((self.buffer.into_table(), self.metadata))
    }

    /// Sync and write the table with its metadata; returns the new dataset id
    pub fn persist<S: DatasetStore + ?Sized>(&mut self, store: &S) -> EmgResult<String> {
        let table = self.buffer.read()?;
        store.store(table, &self.metadata)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            buffer: self.buffer.stats(),
            filters_applied: self.filters.applied().len(),
            filters_pending: self.filters.pending_len(),
            extractors_scheduled: self.features.scheduled_len(),
        }
    }
}
