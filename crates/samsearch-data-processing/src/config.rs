use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tracing::warn;

use super::error::{DataError, Result};

pub const DATA_PATH_DEFAULT: &str = "./public/SAM_PUBLIC_UTF8_MONTHLY_V2_20250302.dat";
pub const MAX_ROWS_DEFAULT: usize = 5000;

/// Source file path, overridable with `SAM_DATA_PATH`.
pub static DATA_PATH: Lazy<PathBuf> = Lazy::new(|| {
    let path = std::env::var("SAM_DATA_PATH").unwrap_or_else(|_| DATA_PATH_DEFAULT.to_string());
    PathBuf::from(path)
});

/// Row cap, overridable with `SAM_MAX_ROWS`.
pub static MAX_ROWS: Lazy<usize> = Lazy::new(|| match std::env::var("SAM_MAX_ROWS") {
    Ok(raw) => raw.parse().unwrap_or_else(|_| {
        warn!(value = %raw, "Ignoring unparsable SAM_MAX_ROWS");
        MAX_ROWS_DEFAULT
    }),
    Err(_) => MAX_ROWS_DEFAULT,
});

/// How a delimited entity extract is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Path of the delimited file
    pub path: PathBuf,
    /// Field separator (`,` for CSV exports, `|` for the monthly extract)
    pub delimiter: u8,
    /// Maximum number of data rows to read; `None` reads everything
    pub max_rows: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            path: DATA_PATH.clone(),
            delimiter: b',',
            max_rows: Some(*MAX_ROWS),
        }
    }
}

impl IngestConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_rows == Some(0) {
            return Err(DataError::InvalidConfig(
                "max_rows must be greater than zero".to_string(),
            ));
        }
        if self.delimiter == b'"' || self.delimiter == b'\n' {
            return Err(DataError::InvalidConfig(format!(
                "delimiter {:?} cannot be used as a field separator",
                char::from(self.delimiter)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = IngestConfig::new("entities.dat")
            .delimiter(b'|')
            .max_rows(None);

        assert_eq!(config.path, PathBuf::from("entities.dat"));
        assert_eq!(config.delimiter, b'|');
        assert_eq!(config.max_rows, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_rows_rejected() {
        let config = IngestConfig::new("entities.csv").max_rows(Some(0));
        assert!(matches!(
            config.validate(),
            Err(DataError::InvalidConfig(_))
        ));
    }
}
