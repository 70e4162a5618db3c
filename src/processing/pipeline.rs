// src/processing/pipeline.rs
//! Filter pipeline: FIFO of scheduled filters applied in sequence to the buffered table

use crate::acquisition::SignalBuffer;
use crate::error::{EmgError, EmgResult};
use crate::processing::filters::SignalFilter;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Scheduled and applied filters of one signal buffer
#[derive(Default)]
pub struct FilterPipeline {
    pending: VecDeque<Box<dyn SignalFilter>>,
    applied: Vec<Box<dyn SignalFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a filter behind those already scheduled
    pub fn schedule(&mut self, filter: Box<dyn SignalFilter>) {
        debug!(filter = filter.name(), position = self.pending.len(), "filter scheduled");
        self.pending.push_back(filter);
    }

    /// Apply every scheduled filter in FIFO order, each on the previous stage's output
    ///
    /// Requires at least one scheduled filter and a buffer that has been read at
    /// least once. The whole run is committed only if every stage succeeds: on
    /// failure the table and the history are untouched and the dequeued filters go
    /// back to the front of the queue in their original order.
    ///
    /// Returns the number of filters applied.
    pub fn apply_all(&mut self, buffer: &mut SignalBuffer) -> EmgResult<usize> {
        if self.pending.is_empty() {
            return Err(EmgError::NoFiltersScheduled);
        }
        if !buffer.has_synced() {
            return Err(EmgError::StaleReadRequired {
                operation: "applying filters",
            });
        }

        let started = Instant::now();
        let mut taken: Vec<Box<dyn SignalFilter>> = Vec::with_capacity(self.pending.len());
        let mut current = None;

        while let Some(filter) = self.pending.pop_front() {
            let input = current.as_ref().unwrap_or_else(|| buffer.table());
            match filter.apply(input) {
                Ok(output) => {
                    debug!(
                        filter = filter.name(),
                        rows = output.rows(),
                        channels = output.channels(),
                        "filter stage complete"
                    );
                    current = Some(output);
                    taken.push(filter);
                }
                Err(err) => {
                    warn!(filter = filter.name(), error = %err, "filter stage failed, rolling back");
                    self.pending.push_front(filter);
                    for filter in taken.into_iter().rev() {
                        self.pending.push_front(filter);
                    }
                    return Err(err);
                }
            }
        }

        let count = taken.len();
        if let Some(table) = current {
            buffer.replace_table(table);
        }
        self.applied.extend(taken);

        info!(
            filters = count,
            elapsed_us = started.elapsed().as_micros() as u64,
            "filter pipeline applied"
        );
        Ok(count)
    }

    /// Names of filters waiting to run, in order
    pub fn pending(&self) -> Vec<&str> {
        self.pending.iter().map(|f| f.name()).collect()
    }

    /// Names of filters already applied, in order
    pub fn applied(&self) -> Vec<&str> {
        self.applied.iter().map(|f| f.name()).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop every scheduled-but-unapplied filter
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("pending", &self.pending())
            .field("applied", &self.applied())
            .finish()
    }
}
