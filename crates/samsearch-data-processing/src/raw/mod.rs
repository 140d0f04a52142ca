use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::config::IngestConfig;
use super::error::{DataError, Result};
use super::row::{RawRow, RowSource, columns};

/// A header-addressed delimited file on disk.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    config: IngestConfig,
}

impl CsvSource {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Source for `path` with every other setting at its default.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(IngestConfig::new(path))
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }
}

impl RowSource for CsvSource {
    fn load_rows(&self) -> Result<Vec<RawRow>> {
        read_raw_rows(&self.config)
    }
}

/// Read the entity extract described by `config` into raw rows.
///
/// Every column is read as a string. Columns the index does not use are
/// dropped; columns missing from the header are simply absent from each row.
#[instrument(name = "Read entity extract", skip_all, fields(path = %config.path.display()), level = "info")]
pub fn read_raw_rows(config: &IngestConfig) -> Result<Vec<RawRow>> {
    config.validate()?;
    if !config.path.is_file() {
        warn!("Entity source file not found");
        return Err(DataError::SourceNotFound(config.path.clone()));
    }

    let t_read = std::time::Instant::now();
    let df = LazyCsvReader::new(&config.path)
        .with_separator(config.delimiter)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_n_rows(config.max_rows)
        .finish()?
        .collect()?;
    debug!(
        rows = df.height(),
        read_time = ?t_read.elapsed(),
        "Collected extract into memory"
    );

    let rows = rows_from_df(&df)?;
    info!(rows = rows.len(), "Read raw entity rows");
    Ok(rows)
}

/// Convert a string-typed frame into raw rows, keeping only known columns.
pub fn rows_from_df(df: &DataFrame) -> Result<Vec<RawRow>> {
    let mut present = Vec::with_capacity(columns::ALL.len());
    for name in columns::ALL {
        match df.column(name) {
            Ok(column) => present.push((name, column.cast(&DataType::String)?)),
            Err(_) => debug!(column = name, "Column missing from extract"),
        }
    }
    if present.is_empty() {
        warn!("Extract has none of the expected entity columns");
    }

    let string_columns = present
        .iter()
        .map(|(name, column)| Ok((*name, column.str()?)))
        .collect::<Result<Vec<_>>>()?;

    let rows = (0..df.height())
        .map(|idx| {
            string_columns
                .iter()
                .map(|(name, values)| (*name, values.get(idx).unwrap_or_default()))
                .collect::<RawRow>()
        })
        .collect();
    Ok(rows)
}
