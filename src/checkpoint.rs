//! Periodic full rewrites of everything collected so far.
//!
//! After every `every` processed items, and once more when the run ends,
//! the whole accumulated set is rewritten to `{stem}_temp.csv`. At most
//! `every - 1` processed items are ever missing from the temp file. The
//! final timestamped artifacts are written separately by [`CheckpointSink::finish`].

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::flatten::Flatten;
use crate::storage::{Artifacts, StorageManager};

pub const DEFAULT_CHECKPOINT_EVERY: usize = 5;

/// What a sink leaves behind once a run is over.
#[derive(Debug)]
pub struct SinkReport<R> {
    pub records: Vec<R>,
    /// Items that were attempted, successful or not.
    pub processed: usize,
    pub failed: usize,
    pub checkpoint: Option<PathBuf>,
    /// `None` if the final write failed; the temp checkpoint still holds
    /// everything.
    pub artifacts: Option<Artifacts>,
}

pub struct CheckpointSink<'s, R> {
    storage: &'s StorageManager,
    stem: String,
    every: usize,
    records: Vec<R>,
    processed: usize,
    failed: usize,
    checkpointed_at: usize,
    checkpoints: usize,
    checkpoint_path: Option<PathBuf>,
}

impl<'s, R: Flatten + Serialize> CheckpointSink<'s, R> {
    pub fn new(storage: &'s StorageManager, stem: impl Into<String>, every: usize) -> Self {
        Self {
            storage,
            stem: stem.into(),
            every: every.max(1),
            records: Vec::new(),
            processed: 0,
            failed: 0,
            checkpointed_at: 0,
            checkpoints: 0,
            checkpoint_path: None,
        }
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
        self.tick();
    }

    /// Counts an item that could not be extracted.
    pub fn record_failure(&mut self) {
        self.failed += 1;
        self.tick();
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Number of temp rewrites so far.
    pub fn checkpoints(&self) -> usize {
        self.checkpoints
    }

    fn tick(&mut self) {
        self.processed += 1;
        if self.processed % self.every == 0 {
            self.checkpoint_now();
        }
    }

    pub fn temp_file_name(&self) -> String {
        format!("{}_temp.csv", self.stem)
    }

    /// Rewrites the temp file with every record so far. A failed write is
    /// logged and the records stay in memory.
    pub fn checkpoint_now(&mut self) {
        self.checkpointed_at = self.processed;
        self.checkpoints += 1;
        match self.storage.store_flat(&self.temp_file_name(), &self.records) {
            Ok(path) => {
                debug!(count = self.records.len(), path = %path.display(), "checkpoint written");
                self.checkpoint_path = Some(path);
            }
            Err(e) => error!(error = %e, "checkpoint write failed"),
        }
    }

    /// Final checkpoint (unless the last item already triggered one), then
    /// the authoritative `{stem}_{timestamp}` JSON and CSV.
    pub fn finish(mut self, timestamp: &str) -> SinkReport<R> {
        if self.checkpointed_at != self.processed || self.checkpoints == 0 {
            self.checkpoint_now();
        }
        let artifacts = match self.storage.store_records(&self.stem, timestamp, &self.records) {
            Ok(artifacts) => Some(artifacts),
            Err(e) => {
                error!(error = %e, stem = %self.stem, "final write failed, temp checkpoint kept");
                None
            }
        };
        info!(
            stem = %self.stem,
            processed = self.processed,
            saved = self.records.len(),
            failed = self.failed,
            "sink finished"
        );
        SinkReport {
            records: self.records,
            processed: self.processed,
            failed: self.failed,
            checkpoint: self.checkpoint_path,
            artifacts,
        }
    }
}
