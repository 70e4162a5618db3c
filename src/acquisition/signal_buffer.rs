// src/acquisition/signal_buffer.rs
//! Signal buffer: cheap ingestion into the sample queue, batched materialization on read

use crate::acquisition::sample_queue::{QueueStats, SampleQueue};
use crate::error::{EmgError, EmgResult};
use crate::signal::{SampleRow, SignalTable};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Length check applied to rows on the ingestion path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShapePolicy {
    pub channels: usize,
    pub validate: bool,
}

impl RowShapePolicy {
    /// Fail fast when a row's length differs from the channel count
    pub fn check(&self, row: &[f32]) -> EmgResult<()> {
        if self.validate && row.len() != self.channels {
            warn!(expected = self.channels, actual = row.len(), "rejecting malformed row");
            return Err(EmgError::RowShape {
                expected: self.channels,
                actual: row.len(),
            });
        }
        Ok(())
    }
}

/// Device-link handle feeding one buffer's queue
///
/// Cloneable and `Send + Sync`; the transport callback owns one of these instead of
/// reaching for process-wide state.
#[derive(Debug, Clone)]
pub struct SampleProducer {
    queue: Arc<SampleQueue>,
    policy: RowShapePolicy,
    // Shared by clones of this handle
    delivered: Arc<AtomicU64>,
}

impl SampleProducer {
    /// Deliver one acquisition tick. No acknowledgment beyond the result.
    pub fn deliver_row(&self, values: impl Into<SampleRow>) -> EmgResult<()> {
        let row = values.into();
        self.policy.check(&row)?;
        self.queue.enqueue(row)?;
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Rows accepted through this handle and its clones
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Channel count rows are expected to carry
    pub fn channels(&self) -> usize {
        self.policy.channels
    }

    /// Rows still waiting for the consumer to sync
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Buffer traffic summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
    pub queue: QueueStats,
    pub rows_materialized: usize,
    pub syncs: u64,
}

/// Owns the materialized table and keeps it in step with the sample queue
#[derive(Debug)]
pub struct SignalBuffer {
    queue: Arc<SampleQueue>,
    table: SignalTable,
    policy: RowShapePolicy,
    // Rows drained by a sync that could not be appended (table reshaped by a filter)
    unmerged: Vec<SampleRow>,
    synced: bool,
    syncs: u64,
}

impl SignalBuffer {
    /// Empty buffer with an unbounded queue and row validation enabled
    pub fn new(channels: usize) -> Self {
        Self::with_queue(channels, SampleQueue::unbounded(), true)
    }

    /// Empty buffer around a preconfigured queue
    pub fn with_queue(channels: usize, queue: SampleQueue, validate: bool) -> Self {
        Self {
            queue: Arc::new(queue),
            table: SignalTable::new(channels),
            policy: RowShapePolicy { channels, validate },
            unmerged: Vec::new(),
            synced: false,
            syncs: 0,
        }
    }

    /// Buffer reconstituted from an already materialized table
    ///
    /// The table counts as synced: there is nothing queued that it could miss.
    pub fn from_table(table: SignalTable) -> Self {
        let channels = table.channels();
        Self {
            queue: Arc::new(SampleQueue::unbounded()),
            table,
            policy: RowShapePolicy { channels, validate: true },
            unmerged: Vec::new(),
            synced: true,
            syncs: 0,
        }
    }

    /// Hot ingestion path: enqueue only, the table is not touched
    pub fn add_data_row(&self, row: impl Into<SampleRow>) -> EmgResult<()> {
        let row = row.into();
        self.policy.check(&row)?;
        self.queue.enqueue(row)
    }

    /// Handle for the device link
    pub fn producer(&self) -> SampleProducer {
        SampleProducer {
            queue: Arc::clone(&self.queue),
            policy: self.policy,
            delivered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// True exactly when rows are waiting to be materialized
    pub fn is_outdated(&self) -> bool {
        !self.queue.is_empty() || !self.unmerged.is_empty()
    }

    /// Up-to-date table, syncing first when outdated
    ///
    /// Every row enqueued before the call is reflected. Rows enqueued while the
    /// call runs may or may not be.
    pub fn read(&mut self) -> EmgResult<&SignalTable> {
        if self.is_outdated() {
            self.sync()?;
        } else {
            self.synced = true;
        }
        Ok(&self.table)
    }

    /// Drain the queue and append everything in one batch; returns the row count
    pub fn sync(&mut self) -> EmgResult<usize> {
        let mut batch = std::mem::take(&mut self.unmerged);
        batch.extend(self.queue.drain_all());
        let drained = batch.len();

        let channels = self.table.channels();
        if let Some(bad) = batch.iter().find(|row| row.len() != channels) {
            let err = EmgError::RowShape {
                expected: channels,
                actual: bad.len(),
            };
            warn!(rows = drained, error = %err, "sync could not merge drained rows");
            self.unmerged = batch;
            return Err(err);
        }
        self.table.append_rows(batch)?;

        self.synced = true;
        self.syncs += 1;
        debug!(rows = drained, total = self.table.rows(), "signal synced");
        Ok(drained)
    }

    /// Whether at least one read/sync materialized the table
    pub fn has_synced(&self) -> bool {
        self.synced
    }

    /// Rows kept aside after a failed merge; taking them clears the backlog
    pub fn take_unmerged(&mut self) -> Vec<SampleRow> {
        std::mem::take(&mut self.unmerged)
    }

    /// Channel count rows are validated against
    pub fn channels(&self) -> usize {
        self.policy.channels
    }

    /// Table as of the last sync, without syncing
    pub(crate) fn table(&self) -> &SignalTable {
        &self.table
    }

    pub(crate) fn replace_table(&mut self, table: SignalTable) {
        self.table = table;
    }

    /// Hand the table off by value
    pub(crate) fn into_table(self) -> SignalTable {
        self.table
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            queue: self.queue.stats(),
            rows_materialized: self.table.rows(),
            syncs: self.syncs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_row_does_not_touch_table() {
        let buffer = SignalBuffer::new(2);
        buffer.add_data_row(vec![1.0, 2.0]).unwrap();

        assert!(buffer.is_outdated());
        assert_eq!(buffer.table().rows(), 0);
    }

    #[test]
    fn test_staleness_cleared_by_read() {
        let mut buffer = SignalBuffer::new(2);
        assert!(!buffer.is_outdated());

        buffer.add_data_row(vec![1.0, 2.0]).unwrap();
        assert!(buffer.is_outdated());

        assert_eq!(buffer.read().unwrap().rows(), 1);
        assert!(!buffer.is_outdated());
        assert!(buffer.has_synced());
    }

    #[test]
    fn test_read_without_pending_rows_is_idempotent() {
        let mut buffer = SignalBuffer::new(2);
        buffer.add_data_row(vec![1.0, 2.0]).unwrap();

        let first = buffer.read().unwrap().clone();
        let second = buffer.read().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(buffer.stats().syncs, 1);
    }

    #[test]
    fn test_rejects_malformed_row() {
        let buffer = SignalBuffer::new(4);
        let err = buffer.add_data_row(vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EmgError::RowShape { expected: 4, actual: 2 }));
        assert!(!buffer.is_outdated());
    }

    #[test]
    fn test_unvalidated_malformed_row_is_kept_not_lost() {
        let mut buffer = SignalBuffer::with_queue(2, SampleQueue::unbounded(), false);
        buffer.add_data_row(vec![1.0, 2.0]).unwrap();
        buffer.add_data_row(vec![3.0]).unwrap();

        assert!(matches!(buffer.read(), Err(EmgError::RowShape { .. })));
        assert!(buffer.is_outdated());
        assert_eq!(buffer.take_unmerged().len(), 2);
        assert!(!buffer.is_outdated());
    }

    #[test]
    fn test_producer_shares_queue() {
        let mut buffer = SignalBuffer::new(3);
        let producer = buffer.producer();
        producer.deliver_row(vec![1.0, 2.0, 3.0]).unwrap();
        producer.deliver_row([4.0, 5.0, 6.0].to_vec()).unwrap();
        assert_eq!(producer.pending(), 2);
        assert!(producer.deliver_row(vec![7.0]).is_err());
        assert_eq!(producer.clone().delivered(), 2);

        assert_eq!(buffer.read().unwrap().rows(), 2);
        assert_eq!(producer.pending(), 0);
    }

    #[test]
    fn test_from_table_counts_as_synced() {
        let table = SignalTable::from_rows(2, vec![vec![1.0, 2.0]]).unwrap();
        let buffer = SignalBuffer::from_table(table);
        assert!(buffer.has_synced());
        assert_eq!(buffer.channels(), 2);
    }
}
