// src/acquisition/sample_queue.rs
//! Lock-free inbox for raw sample rows arriving from the device link

use crate::error::{EmgError, EmgResult};
use crate::signal::SampleRow;
use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Unbounded (or optionally bounded) FIFO of pending rows
///
/// `enqueue` and `drain_all` may be called concurrently from different threads
/// without external locking. Rows come out in exactly the order they went in.
#[derive(Debug)]
pub struct SampleQueue {
    rows: SegQueue<SampleRow>,
    capacity: Option<usize>,

    // Atomic counters for metrics
    enqueued: AtomicU64,
    drained: AtomicU64,
    rejected: AtomicU64,
}

/// Counters describing the queue's lifetime traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub enqueued: u64,
    pub drained: u64,
    pub rejected: u64,
    pub pending: usize,
}

impl SampleQueue {
    /// Queue without a hard memory bound
    pub fn unbounded() -> Self {
        Self {
            rows: SegQueue::new(),
            capacity: None,
            enqueued: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Queue that refuses rows once `capacity` rows are pending
    pub fn bounded(capacity: usize) -> EmgResult<Self> {
        if capacity == 0 {
            return Err(EmgError::configuration("queue capacity must be greater than zero"));
        }
        Ok(Self {
            capacity: Some(capacity),
            ..Self::unbounded()
        })
    }

    /// Build from an optional capacity, `None` meaning unbounded
    pub fn with_capacity(capacity: Option<usize>) -> EmgResult<Self> {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Ok(Self::unbounded()),
        }
    }

    /// Append one row; never blocks
    pub fn enqueue(&self, row: SampleRow) -> EmgResult<()> {
        if let Some(capacity) = self.capacity {
            if self.rows.len() >= capacity {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                return Err(EmgError::Capacity { capacity });
            }
        }

        self.rows.push(row);
        let total = self.enqueued.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(total, "row enqueued");
        Ok(())
    }

    /// Remove and return every row queued at the instant of the call
    ///
    /// The cut is taken by reading the current depth first, so a producer that
    /// keeps pushing cannot extend the drain. Rows pushed after the cut stay
    /// queued for the next drain.
    pub fn drain_all(&self) -> Vec<SampleRow> {
        let depth = self.rows.len();
        let mut drained = Vec::with_capacity(depth);
        for _ in 0..depth {
            match self.rows.pop() {
                Some(row) => drained.push(row),
                None => break,
            }
        }
        self.drained.fetch_add(drained.len() as u64, Ordering::Relaxed);
        drained
    }

    /// Staleness predicate of the owning buffer
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of pending rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Configured hard bound, if any
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Snapshot of the traffic counters
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            pending: self.rows.len(),
        }
    }
}

impl Default for SampleQueue {
    fn default() -> Self {
        Self::unbounded()
    }
}
