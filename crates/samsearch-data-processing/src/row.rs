//! The raw row contract shared by every ingestion source.
//!
//! A [`RawRow`] is an ordered list of named string fields, exactly as they were
//! read from the source. Nothing past this boundary should need to look fields
//! up by name; the core converts rows into typed records immediately.

use super::error::Result;

/// Column names of the SAM entity extract that the index cares about.
pub mod columns {
    pub const UNIQUE_ENTITY_ID: &str = "UNIQUE_ENTITY_ID";
    pub const LEGAL_BUSINESS_NAME: &str = "LEGAL_BUSINESS_NAME";
    pub const PHYSICAL_ADDRESS_LINE_1: &str = "PHYSICAL_ADDRESS_LINE_1";
    pub const PHYSICAL_ADDRESS_CITY: &str = "PHYSICAL_ADDRESS_CITY";
    pub const PHYSICAL_ADDRESS_STATE_OR_PROVINCE_CODE: &str =
        "PHYSICAL_ADDRESS_STATE_OR_PROVINCE_CODE";
    pub const PHYSICAL_ADDRESS_ZIP_CODE: &str = "PHYSICAL_ADDRESS_ZIP_CODE";
    pub const PHYSICAL_ADDRESS_COUNTRY_CODE: &str = "PHYSICAL_ADDRESS_COUNTRY_CODE";
    pub const CAPABILITY_NARRATIVE: &str = "CAPABILITY_NARRATIVE";
    pub const REGISTRATION_STATUS: &str = "REGISTRATION_STATUS";

    /// Every column read from the source, in extract order.
    pub const ALL: [&str; 9] = [
        UNIQUE_ENTITY_ID,
        LEGAL_BUSINESS_NAME,
        PHYSICAL_ADDRESS_LINE_1,
        PHYSICAL_ADDRESS_CITY,
        PHYSICAL_ADDRESS_STATE_OR_PROVINCE_CODE,
        PHYSICAL_ADDRESS_ZIP_CODE,
        PHYSICAL_ADDRESS_COUNTRY_CODE,
        CAPABILITY_NARRATIVE,
        REGISTRATION_STATUS,
    ];
}

/// Separator between phrases in `CAPABILITY_NARRATIVE`.
pub const CAPABILITY_SEPARATOR: char = ';';

/// Split a capability narrative into trimmed phrases. An empty narrative has
/// no phrases; empty segments between separators are kept as empty phrases.
pub fn split_capability_narrative(narrative: &str) -> Vec<String> {
    if narrative.is_empty() {
        return Vec::new();
    }
    narrative
        .split(CAPABILITY_SEPARATOR)
        .map(|phrase| phrase.trim().to_string())
        .collect()
}

/// One source row, addressed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Lookups return the first field with a given name.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Field value, or the empty string when the column is absent.
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Anything that can hand the index builder a batch of raw rows.
///
/// Returning an error means the source itself is unavailable. Individual
/// malformed rows are not errors; they are passed through and dealt with by
/// the builder.
pub trait RowSource: Send + Sync {
    fn load_rows(&self) -> Result<Vec<RawRow>>;
}

impl RowSource for Vec<RawRow> {
    fn load_rows(&self) -> Result<Vec<RawRow>> {
        Ok(self.clone())
    }
}

impl RowSource for [RawRow] {
    fn load_rows(&self) -> Result<Vec<RawRow>> {
        Ok(self.to_vec())
    }
}

impl<S: RowSource + ?Sized> RowSource for &S {
    fn load_rows(&self) -> Result<Vec<RawRow>> {
        (**self).load_rows()
    }
}
