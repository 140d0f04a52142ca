//! Raw record ingestion for the samsearch entity index.
//!
//! This crate owns the boundary between files on disk and the index: it reads
//! a header-addressed delimited SAM entity extract into [`RawRow`]s and reports
//! a missing or unreadable source as a [`DataError`]. Parsing rows into typed
//! records is left to the core crate.

pub mod config;
mod error;
pub mod raw;
pub mod row;
pub mod test_data;

pub use config::{DATA_PATH, DATA_PATH_DEFAULT, IngestConfig, MAX_ROWS, MAX_ROWS_DEFAULT};
pub use error::{DataError, Result};
pub use raw::{CsvSource, read_raw_rows};
pub use row::{
    CAPABILITY_SEPARATOR, RawRow, RowSource, columns, split_capability_narrative,
};
pub use test_data::{TestDataConfig, create_test_data, sample_rows};
