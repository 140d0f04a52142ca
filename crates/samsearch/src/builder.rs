//! Single-pass construction of an [`EntityIndex`] from raw rows.

use std::time::{Duration, Instant};

use samsearch_data_processing::RawRow;
use tracing::{debug, info, instrument, trace};

use crate::{
    index::{CapabilityIndex, EntityIndex, NameIndex, RegionIndex},
    record::{EntityRecord, is_reserved_id},
    store::RecordStore,
};

const PROGRESS_EVERY: usize = 1000;

/// Counters describing one completed build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Rows handed to the builder
    pub rows_read: usize,
    /// Rows that produced a record (including ones later replaced)
    pub records_indexed: usize,
    /// Rows dropped for an empty or reserved identifier
    pub rows_skipped: usize,
    /// Rows whose identifier was already in the store
    pub records_replaced: usize,
    /// Distinct name tokens
    pub name_tokens: usize,
    /// Distinct region codes
    pub regions: usize,
    /// Distinct capability tokens
    pub capability_tokens: usize,
    pub elapsed: Duration,
}

/// Accumulates records and postings. Consumed by [`IndexBuilder::finish`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: EntityIndex,
    summary: BuildSummary,
}

impl IndexBuilder {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            index: EntityIndex {
                store: RecordStore::with_capacity(rows),
                names: NameIndex::default(),
                regions: RegionIndex::default(),
                capabilities: CapabilityIndex::default(),
            },
            summary: BuildSummary::default(),
        }
    }

    /// Convert and index one row. Rows without a usable identifier are
    /// dropped silently.
    pub fn push(&mut self, row: &RawRow) {
        self.summary.rows_read += 1;

        let record = EntityRecord::from_raw(row);
        if record.uei.is_empty() || is_reserved_id(&record.uei) {
            trace!(uei = %record.uei, "Skipping row without usable identifier");
            self.summary.rows_skipped += 1;
            return;
        }

        self.index.names.index_record(&record);
        self.index.regions.index_record(&record);
        self.index.capabilities.index_record(&record);
        if self.index.store.insert(record).is_some() {
            self.summary.records_replaced += 1;
        }
        self.summary.records_indexed += 1;

        if self.summary.rows_read % PROGRESS_EVERY == 0 {
            debug!(rows = self.summary.rows_read, "Processed entities...");
        }
    }

    pub fn finish(mut self) -> (EntityIndex, BuildSummary) {
        self.summary.name_tokens = self.index.names.len();
        self.summary.regions = self.index.regions.len();
        self.summary.capability_tokens = self.index.capabilities.len();
        (self.index, self.summary)
    }
}

/// Build the record store and all three indices from `rows` in one pass.
#[instrument(name = "Build entity index", level = "info", skip_all, fields(rows = rows.len()))]
pub fn build_index(rows: &[RawRow]) -> (EntityIndex, BuildSummary) {
    let t_build = Instant::now();
    let mut builder = IndexBuilder::with_capacity(rows.len());
    for row in rows {
        builder.push(row);
    }
    let (index, mut summary) = builder.finish();
    summary.elapsed = t_build.elapsed();

    debug_assert!(
        index.check_integrity().is_ok(),
        "freshly built index references unknown entities"
    );
    info!(
        records = index.store().len(),
        skipped = summary.rows_skipped,
        replaced = summary.records_replaced,
        name_tokens = summary.name_tokens,
        elapsed = ?summary.elapsed,
        "Finished building entity index"
    );
    (index, summary)
}
