//! The entity search service.
//!
//! [`EntitySearchService`] owns the initialization state machine and, once a
//! build succeeds, the immutable [`EntityIndex`] snapshot. It is the only
//! object callers need to hold; share it behind an `Arc`.
//!
//! ```rust
//! use samsearch::{EntitySearchService, SearchFilters, SearchResponse};
//! use samsearch::data_processing::{TestDataConfig, sample_rows};
//!
//! let service = EntitySearchService::new();
//! service.build(&sample_rows(&TestDataConfig::sample()));
//!
//! let response = service.search("construction", &SearchFilters::new().region("TX"));
//! assert!(matches!(response, SearchResponse::Matches(ref records) if !records.is_empty()));
//! ```

use once_cell::sync::OnceCell;
use samsearch_data_processing::{CsvSource, IngestConfig, RowSource};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    builder::{BuildSummary, build_index},
    config::SearchConfig,
    error::SamSearchError,
    index::EntityIndex,
    record::EntityRecord,
    search::{SearchFilters, SearchResponse, bulk_search_index, search_index},
    state::{IndexStatus, InitState},
};

#[derive(Debug)]
struct Snapshot {
    index: EntityIndex,
    summary: BuildSummary,
}

/// In-memory entity index with a build-once lifecycle.
///
/// `build` may be called any number of times from any number of threads; only
/// the first call does work. Searches never block: while the build is running
/// they get [`SearchResponse::Loading`], after a failed build
/// [`SearchResponse::Unavailable`].
#[derive(Debug, Default)]
pub struct EntitySearchService {
    state: InitState,
    snapshot: OnceCell<Snapshot>,
    failure: OnceCell<SamSearchError>,
    config: SearchConfig,
}

impl EntitySearchService {
    /// Create an empty service with the default search configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn status(&self) -> IndexStatus {
        self.state.get()
    }

    /// Build the index from `source`.
    ///
    /// A no-op if a build has already started, whatever its outcome. If the
    /// source cannot be read the service moves to [`IndexStatus::Failed`];
    /// the error is kept for [`failure`](Self::failure) rather than returned.
    #[instrument(name = "Initialize entity index", level = "info", skip_all)]
    pub fn build<S: RowSource + ?Sized>(&self, source: &S) {
        if !self.state.try_begin() {
            debug!(status = %self.status(), "Entity index build already started, ignoring");
            return;
        }
        let guard = BuildGuard {
            service: self,
            completed: false,
        };
        info!("Initializing SAM entity indices...");

        match source.load_rows() {
            Ok(rows) => {
                let (index, summary) = build_index(&rows);
                guard.complete(self.publish(index, summary));
            }
            Err(err) => {
                error!(error = %err, "Error initializing SAM entity indices");
                let _ = self.failure.set(err.into());
                guard.complete(IndexStatus::Failed);
            }
        }
    }

    /// Verify `index` and hand it to readers. Returns the terminal status the
    /// build should finish with.
    fn publish(&self, index: EntityIndex, summary: BuildSummary) -> IndexStatus {
        if let Err(err) = index.check_integrity() {
            error!(error = %err, "Built entity index failed its integrity check");
            let _ = self.failure.set(err.into());
            return IndexStatus::Failed;
        }
        if self.snapshot.set(Snapshot { index, summary }).is_err() {
            warn!("Entity index snapshot was already published");
        }
        IndexStatus::Ready
    }

    /// Build from a delimited extract on disk.
    pub fn build_from_csv(&self, config: IngestConfig) {
        self.build(&CsvSource::new(config));
    }

    /// Search with the service's own configuration.
    pub fn search(&self, query: &str, filters: &SearchFilters) -> SearchResponse {
        self.search_with_config(query, filters, &self.config)
    }

    pub fn search_with_config(
        &self,
        query: &str,
        filters: &SearchFilters,
        config: &SearchConfig,
    ) -> SearchResponse {
        match self.ready_index() {
            Ok(index) => SearchResponse::Matches(search_index(index, query, filters, config)),
            Err(response) => response,
        }
    }

    /// Answer several queries at once. Every element is `Loading` or
    /// `Unavailable` when the index is not ready.
    pub fn search_bulk<S: AsRef<str> + Sync>(
        &self,
        queries: &[(S, SearchFilters)],
    ) -> Vec<SearchResponse> {
        match self.ready_index() {
            Ok(index) => bulk_search_index(index, queries, &self.config)
                .into_iter()
                .map(SearchResponse::Matches)
                .collect(),
            Err(response) => vec![response; queries.len()],
        }
    }

    /// Look an entity up by identifier. `None` until the index is ready.
    pub fn entity(&self, uei: &str) -> Option<&EntityRecord> {
        self.ready_index().ok()?.store().get(uei)
    }

    /// The built index, once ready.
    pub fn index(&self) -> Option<&EntityIndex> {
        self.ready_index().ok()
    }

    /// Counters from the completed build, once ready.
    pub fn summary(&self) -> Option<&BuildSummary> {
        if self.status() == IndexStatus::Ready {
            self.snapshot.get().map(|s| &s.summary)
        } else {
            None
        }
    }

    /// Why the build failed, once failed.
    pub fn failure(&self) -> Option<&SamSearchError> {
        self.failure.get()
    }

    fn ready_index(&self) -> Result<&EntityIndex, SearchResponse> {
        match self.status() {
            IndexStatus::NotStarted | IndexStatus::Building => Err(SearchResponse::Loading),
            IndexStatus::Failed => Err(SearchResponse::Unavailable),
            IndexStatus::Ready => self.snapshot.get().map(|s| &s.index).ok_or_else(|| {
                warn!("Index marked ready without a snapshot");
                SearchResponse::Unavailable
            }),
        }
    }
}

/// Moves the state machine to `Failed` if a build unwinds before finishing.
struct BuildGuard<'a> {
    service: &'a EntitySearchService,
    completed: bool,
}

impl BuildGuard<'_> {
    fn complete(mut self, outcome: IndexStatus) {
        self.completed = true;
        self.service.state.finish(outcome);
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            error!("Entity index build aborted before completion");
            let _ = self.service.failure.set(SamSearchError::Other(anyhow::anyhow!(
                "index build aborted before completion"
            )));
            self.service.state.finish(IndexStatus::Failed);
        }
    }
}
