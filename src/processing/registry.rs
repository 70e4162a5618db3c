// src/processing/registry.rs
//! Feature extraction registry: retained extractors and their cached outputs

use crate::acquisition::SignalBuffer;
use crate::error::{EmgError, EmgResult};
use crate::processing::features::{FeatureExtractor, FeatureTable};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Identity of one scheduled extractor, handed out by [`FeatureRegistry::schedule`]
///
/// Ids increase monotonically, so id order is scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtractorId(u64);

impl ExtractorId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExtractorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extractor#{}", self.0)
    }
}

/// Scheduled extractors and the feature table each produced on its last run
#[derive(Default)]
pub struct FeatureRegistry {
    extractors: BTreeMap<ExtractorId, Box<dyn FeatureExtractor>>,
    cache: BTreeMap<ExtractorId, FeatureTable>,
    next_id: u64,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain an extractor; it runs on every subsequent [`extract_all`](Self::extract_all)
    pub fn schedule(&mut self, extractor: Box<dyn FeatureExtractor>) -> ExtractorId {
        let id = ExtractorId(self.next_id);
        self.next_id += 1;
        debug!(extractor = extractor.name(), %id, "extractor scheduled");
        self.extractors.insert(id, extractor);
        id
    }

    /// Remove an extractor and its cached output
    pub fn unschedule(&mut self, id: ExtractorId) -> Option<Box<dyn FeatureExtractor>> {
        self.cache.remove(&id);
        self.extractors.remove(&id)
    }

    /// Run every scheduled extractor against one snapshot of the buffered table
    ///
    /// Extractors run in parallel and never see each other's output. Results
    /// replace the cached entries only when every extractor succeeds; on failure
    /// the previous cache is kept as is. Returns the number of tables computed.
    pub fn extract_all(&mut self, buffer: &SignalBuffer) -> EmgResult<usize> {
        if !buffer.has_synced() {
            return Err(EmgError::StaleReadRequired {
                operation: "extracting features",
            });
        }

        let started = Instant::now();
        let snapshot = buffer.table();
        let results = self
            .extractors
            .par_iter()
            .map(|(&id, extractor)| {
                extractor
                    .extract(snapshot)
                    .map(|table| (id, table))
                    .map_err(|err| {
                        warn!(extractor = extractor.name(), error = %err, "feature extraction failed");
                        err
                    })
            })
            .collect::<EmgResult<Vec<_>>>()?;

        let count = results.len();
        for (id, table) in results {
            self.cache.insert(id, table);
        }

        info!(
            extractors = count,
            rows = snapshot.rows(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "features extracted"
        );
        Ok(count)
    }

    /// Cached output of one extractor
    pub fn get(&self, id: ExtractorId) -> Option<&FeatureTable> {
        self.cache.get(&id)
    }

    /// Cached output of the earliest scheduled extractor with this name
    pub fn get_by_name(&self, name: &str) -> Option<&FeatureTable> {
        self.extractors
            .iter()
            .filter(|(_, e)| e.name() == name)
            .find_map(|(id, _)| self.cache.get(id))
    }

    /// Cached outputs in scheduling order
    pub fn features(&self) -> impl Iterator<Item = (ExtractorId, &str, &FeatureTable)> + '_ {
        self.cache.iter().filter_map(move |(id, table)| {
            self.extractors
                .get(id)
                .map(|extractor| (*id, extractor.name(), table))
        })
    }

    /// Names of scheduled extractors in scheduling order
    pub fn scheduled(&self) -> Vec<&str> {
        self.extractors.values().map(|e| e.name()).collect()
    }

    pub fn scheduled_len(&self) -> usize {
        self.extractors.len()
    }

    /// Forget cached outputs, keeping the extractors scheduled
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureRegistry")
            .field("scheduled", &self.scheduled())
            .field("cached", &self.cache.len())
            .finish()
    }
}
