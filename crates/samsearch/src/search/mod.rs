//! Query execution over a built [`EntityIndex`].
//!
//! A search gathers candidate identifiers from the name token index, narrows
//! them with the region and capability indices (or seeds them from the first
//! filter when the query matched nothing), falls back to substring matching on
//! name tokens when still empty, then resolves, ranks and truncates.

use ahash::AHashSet as HashSet;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::{
    config::SearchConfig,
    index::{EntityIndex, IndexDefinition, NameIndexDef},
    record::EntityRecord,
};

/// Optional narrowing criteria for a search.
///
/// ```rust
/// use samsearch::SearchFilters;
///
/// let filters = SearchFilters::new()
///     .region("TX")
///     .capability("concrete work");
/// assert!(!filters.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// State or province code, matched case-insensitively
    pub region: Option<String>,
    /// Capability phrases; a record matches if any of its phrases shares a
    /// token with any of these
    pub capabilities: Vec<String>,
    /// Registration status code, matched case-insensitively. Only narrows.
    pub registration_status: Option<String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities
            .extend(capabilities.into_iter().map(Into::into));
        self
    }

    pub fn registration_status(mut self, status: impl Into<String>) -> Self {
        self.registration_status = Some(status.into());
        self
    }

    fn active_region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.trim().is_empty())
    }

    fn active_status(&self) -> Option<&str> {
        self.registration_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.active_region().is_none()
            && self.capabilities.is_empty()
            && self.active_status().is_none()
    }
}

/// Outcome of a search against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResponse {
    /// The index is still being built; ask again later.
    Loading,
    /// The index failed to build and will not become available.
    Unavailable,
    /// Ranked matches, possibly empty.
    Matches(Vec<EntityRecord>),
}

impl SearchResponse {
    /// `"ok"`, `"loading"` or `"error"`.
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Unavailable => "error",
            Self::Matches(_) => "ok",
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Matches(_))
    }

    /// Matched records; empty for the loading and unavailable outcomes.
    pub fn records(&self) -> &[EntityRecord] {
        match self {
            Self::Matches(records) => records,
            Self::Loading | Self::Unavailable => &[],
        }
    }

    /// Flatten into a plain record list. The loading and unavailable outcomes
    /// become a single sentinel record whose identifier is reserved.
    pub fn into_records(self) -> Vec<EntityRecord> {
        match self {
            Self::Loading => vec![EntityRecord::loading()],
            Self::Unavailable => vec![EntityRecord::unavailable()],
            Self::Matches(records) => records,
        }
    }
}

/// Insertion-ordered set of identifiers borrowed from the index.
#[derive(Debug, Clone, Default)]
struct CandidateSet<'a> {
    order: Vec<&'a str>,
    seen: HashSet<&'a str>,
}

impl<'a> CandidateSet<'a> {
    fn from_ids(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::default();
        for id in ids {
            if set.seen.insert(id) {
                set.order.push(id);
            }
        }
        set
    }

    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    fn retain_in(&mut self, other: &Self) {
        self.order.retain(|id| other.contains(id));
        self.seen.retain(|id| other.contains(id));
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Intersect `candidates` with `filter`. Empty candidates are seeded from
/// `filter` instead, unless an earlier filter already emptied them. Returns
/// whether the candidates were seeded.
fn narrow<'a>(
    candidates: &mut CandidateSet<'a>,
    filter: &CandidateSet<'a>,
    filtered_before: bool,
) -> bool {
    if !candidates.is_empty() {
        candidates.retain_in(filter);
        false
    } else if !filtered_before {
        *candidates = filter.clone();
        true
    } else {
        false
    }
}

/// Run one query against `index`.
#[instrument(name = "Entity search", level = "debug", skip_all, fields(query = query))]
pub fn search_index(
    index: &EntityIndex,
    query: &str,
    filters: &SearchFilters,
    config: &SearchConfig,
) -> Vec<EntityRecord> {
    let normalized_query = query.to_lowercase();
    let query_tokens = NameIndexDef.query_keys(query);

    let mut candidates = CandidateSet::from_ids(
        query_tokens
            .iter()
            .flat_map(|token| index.names.get(token).iter().map(String::as_str)),
    );

    let mut applied_filters = Vec::with_capacity(2);
    let mut seeded_by_filter = false;
    if let Some(region) = filters.active_region() {
        let region_ids = CandidateSet::from_ids(index.regions.lookup(region));
        seeded_by_filter |= narrow(&mut candidates, &region_ids, !applied_filters.is_empty());
        applied_filters.push(region_ids);
    }
    if !filters.capabilities.is_empty() {
        let capability_ids = CandidateSet::from_ids(
            filters
                .capabilities
                .iter()
                .flat_map(|phrase| index.capabilities.lookup(phrase)),
        );
        seeded_by_filter |= narrow(&mut candidates, &capability_ids, !applied_filters.is_empty());
        applied_filters.push(capability_ids);
    }

    if config.partial_match
        && !query_tokens.is_empty()
        && candidates.is_empty()
        && !seeded_by_filter
    {
        let mut partial = CandidateSet::from_ids(index.names.partial_matches(&query_tokens));
        // the fallback may only widen the query, never escape the filters
        for filter in &applied_filters {
            partial.retain_in(filter);
        }
        debug!(candidates = partial.len(), "No exact token hits, using partial matches");
        candidates = partial;
    }

    let status = filters.active_status();
    let mut records = candidates
        .order
        .iter()
        .filter_map(|id| {
            let record = index.store.get(id);
            debug_assert!(record.is_some(), "index references unknown entity {id}");
            if record.is_none() {
                warn!(uei = id, "Index references an entity missing from the store");
            }
            record
        })
        .filter(|record| status.is_none_or(|s| record.registration_status.eq_ignore_ascii_case(s)))
        .collect::<Vec<_>>();

    rank_records(&mut records, &normalized_query);
    records.truncate(config.limit);
    debug!(results = records.len(), "Entity search complete");
    records.into_iter().cloned().collect()
}

/// Names containing `normalized_query` first, then alphabetical by
/// case-insensitive name, then by exact name. The sort is stable so fully
/// equal names keep their candidate order.
fn rank_records(records: &mut [&EntityRecord], normalized_query: &str) {
    records.sort_by_cached_key(|record| {
        let name = record.legal_business_name.to_lowercase();
        (
            !name.contains(normalized_query),
            name,
            record.legal_business_name.clone(),
        )
    });
}

/// Run many queries against the same index in parallel. Output order matches
/// input order.
#[instrument(name = "Bulk entity search", level = "debug", skip_all, fields(queries = queries.len()))]
pub fn bulk_search_index<S: AsRef<str> + Sync>(
    index: &EntityIndex,
    queries: &[(S, SearchFilters)],
    config: &SearchConfig,
) -> Vec<Vec<EntityRecord>> {
    queries
        .par_iter()
        .map(|(query, filters)| search_index(index, query.as_ref(), filters, config))
        .collect()
}
