use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;
pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Entity source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Invalid ingest configuration: {0}")]
    InvalidConfig(String),
}
