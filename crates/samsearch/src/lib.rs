//! SamSearch - In-memory search over federal contractor registrations
//!
//! SamSearch loads a SAM.gov public entity extract, indexes it in memory and
//! answers keyword queries with optional region, capability and registration
//! status filters.
//!
//! # Quick Start
//!
//! ```rust
//! use samsearch::{EntitySearchService, SearchFilters};
//! use samsearch::data_processing::{TestDataConfig, sample_rows};
//!
//! let service = EntitySearchService::new();
//! service.build(&sample_rows(&TestDataConfig::sample()));
//!
//! let response = service.search("builders", &SearchFilters::new().region("GA"));
//! for record in response.records() {
//!     println!("{} {}", record.uei, record.legal_business_name);
//! }
//! ```
//!
//! # Lifecycle
//!
//! The index is built once per service. Until the build completes every search
//! answers with a single loading placeholder record, and if the build fails
//! every search answers with a single unavailable placeholder. See
//! [`SearchResponse`].
//!
//! # Data
//!
//! Rows come from anything implementing [`RowSource`]. [`CsvSource`] reads a
//! delimited extract with a header row; the path and row cap default to the
//! `SAM_DATA_PATH` and `SAM_MAX_ROWS` environment variables.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod builder;
mod config;
mod core;
pub mod error;
mod index;
mod record;
mod search;
mod state;
mod store;

pub use crate::core::EntitySearchService;

pub use builder::{BuildSummary, IndexBuilder, build_index};
pub use config::{DEFAULT_RESULT_LIMIT, SearchConfig, SearchConfigBuilder};
pub use index::{
    CapabilityIndex, EntityIndex, IndexDefinition, IndexError, MIN_TOKEN_LEN, NameIndex,
    PostingIndex, RegionIndex, normalize_region, tokenize,
};
pub use record::{ERROR_ID, EntityRecord, LOADING_ID, PhysicalAddress, is_reserved_id};
pub use samsearch_data_processing as data_processing;
pub use samsearch_data_processing::{CsvSource, IngestConfig, RawRow, RowSource};
pub use search::{SearchFilters, SearchResponse, bulk_search_index, search_index};
pub use state::IndexStatus;
pub use store::RecordStore;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the SamSearch library.
///
/// Sets up a `tracing` subscriber. `RUST_LOG` takes precedence over `level`
/// when set. Calling this more than once is harmless.
///
/// # Examples
///
/// ```rust
/// use samsearch::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), samsearch::error::SamSearchError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<(), error::SamSearchError> {
    LOGGER_INIT
        .get_or_try_init(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
                .add_directive("polars=warn".parse()?);

            tracing_subscriber::fmt::fmt()
                .with_env_filter(filter)
                .with_span_events(FmtSpan::CLOSE)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
            Ok::<(), error::SamSearchError>(())
        })
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use samsearch_data_processing::{TestDataConfig, create_test_data, sample_rows};

    use super::*;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_init_logging_twice() {
        setup_test_env();
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[test]
    fn test_service_from_csv() {
        setup_test_env();

        let file = create_test_data(&TestDataConfig::sample()).unwrap();
        let service = EntitySearchService::new();
        service.build_from_csv(IngestConfig::new(file.path()));

        assert_eq!(service.status(), IndexStatus::Ready);
        let response = service.search("construction", &SearchFilters::new().region("TX"));
        let ueis = response.records().iter().map(|r| r.uei.as_str()).collect::<Vec<_>>();
        assert_eq!(ueis, ["C111FE1IJKL4", "C111FE1UVWX0"]);
    }

    #[test]
    fn test_minimal_search() {
        setup_test_env();

        let service = EntitySearchService::new();
        service.build(&sample_rows(&TestDataConfig::minimal()));
        let summary = service.summary().unwrap();
        assert_eq!(summary.records_indexed, 3);
        assert!(service.search("", &SearchFilters::new()).records().is_empty());
    }
}
