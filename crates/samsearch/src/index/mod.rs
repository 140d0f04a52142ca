//! Token posting indices over the entity corpus.
//!
//! Three indices share one structure: a map from a normalized key to the
//! identifiers of the records that produced it. What differs is which part of
//! a record supplies the keys, and that is captured by an [`IndexDefinition`].

pub use error::IndexError;
use error::Result;

use ahash::AHashMap as HashMap;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::{record::EntityRecord, store::RecordStore};

/// Tokens shorter than this are never indexed nor looked up.
pub const MIN_TOKEN_LEN: usize = 3;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lower-case `text` and split it on non-word characters, keeping words of at
/// least [`MIN_TOKEN_LEN`] characters. Order and duplicates are preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Normalized form of a region code, used both when indexing and querying.
///
/// Surrounding whitespace is not significant: `" TX"` and `"tx"` are the same
/// region.
pub fn normalize_region(region: &str) -> String {
    region.trim().to_lowercase()
}

/// Defines which keys a record contributes to an index, and how a query value
/// is turned into lookup keys for it.
pub trait IndexDefinition: std::fmt::Debug + Send + Sync + 'static {
    /// Returns the name of this index, used in logs.
    fn name(&self) -> &'static str;

    /// Keys contributed by `record`, in order. Repeats are allowed.
    fn record_keys(&self, record: &EntityRecord) -> Vec<String>;

    /// Lookup keys for a user supplied value.
    fn query_keys(&self, value: &str) -> Vec<String>;
}

/// Index over legal business name tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameIndexDef;

impl IndexDefinition for NameIndexDef {
    fn name(&self) -> &'static str {
        "name_tokens"
    }

    fn record_keys(&self, record: &EntityRecord) -> Vec<String> {
        tokenize(&record.legal_business_name)
    }

    fn query_keys(&self, value: &str) -> Vec<String> {
        tokenize(value)
    }
}

/// Index over the physical address region (state or province) code.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionIndexDef;

impl IndexDefinition for RegionIndexDef {
    fn name(&self) -> &'static str {
        "regions"
    }

    fn record_keys(&self, record: &EntityRecord) -> Vec<String> {
        self.query_keys(record.region())
    }

    fn query_keys(&self, value: &str) -> Vec<String> {
        let region = normalize_region(value);
        if region.is_empty() {
            Vec::new()
        } else {
            vec![region]
        }
    }
}

/// Index over tokens of every declared capability phrase.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityIndexDef;

impl IndexDefinition for CapabilityIndexDef {
    fn name(&self) -> &'static str {
        "capability_tokens"
    }

    fn record_keys(&self, record: &EntityRecord) -> Vec<String> {
        record
            .capabilities
            .iter()
            .flat_map(|phrase| tokenize(phrase))
            .collect()
    }

    fn query_keys(&self, value: &str) -> Vec<String> {
        tokenize(value)
    }
}

/// Key → identifiers, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PostingIndex<D: IndexDefinition> {
    postings: HashMap<String, Vec<String>>,
    definition: D,
}

impl<D: IndexDefinition> PostingIndex<D> {
    pub fn new(definition: D) -> Self {
        Self {
            postings: HashMap::new(),
            definition,
        }
    }

    /// Append `record`'s identifier under each of its keys. Returns the number
    /// of postings written.
    pub(crate) fn index_record(&mut self, record: &EntityRecord) -> usize {
        let keys = self.definition.record_keys(record);
        let written = keys.len();
        for key in keys {
            self.postings
                .entry(key)
                .or_default()
                .push(record.uei.clone());
        }
        written
    }

    /// Identifiers stored under `key`; empty when the key is unknown.
    pub fn get(&self, key: &str) -> &[String] {
        self.postings.get(key).map_or(&[], Vec::as_slice)
    }

    /// Identifiers for every key `value` normalizes to, in key order then
    /// posting order. May contain repeats.
    pub fn lookup<'a>(&'a self, value: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.definition
            .query_keys(value)
            .into_iter()
            .flat_map(move |key| self.get(&key).iter().map(String::as_str))
    }

    /// Identifiers of every key that contains one of `needles` as a substring.
    ///
    /// Scans the whole key set. Matching keys are visited in sorted order so
    /// the output does not depend on hash iteration order.
    #[instrument(name = "Partial key scan", level = "trace", skip_all, fields(index = self.definition.name()))]
    pub fn partial_matches<'a>(&'a self, needles: &[String]) -> Vec<&'a str> {
        let matched_keys = self
            .keys()
            .filter(|key| needles.iter().any(|needle| key.contains(needle.as_str())))
            .sorted_unstable()
            .collect::<Vec<_>>();
        debug!(
            index = self.definition.name(),
            matched_keys = matched_keys.len(),
            "Partial key scan complete"
        );
        matched_keys
            .into_iter()
            .flat_map(|key| self.get(key).iter().map(String::as_str))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    fn identifiers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.postings
            .iter()
            .flat_map(|(key, ids)| ids.iter().map(move |id| (key.as_str(), id.as_str())))
    }
}

/// Token index over legal business names.
pub type NameIndex = PostingIndex<NameIndexDef>;
/// Region code index.
pub type RegionIndex = PostingIndex<RegionIndexDef>;
/// Capability phrase token index.
pub type CapabilityIndex = PostingIndex<CapabilityIndexDef>;

/// The complete, immutable result of one build: the record store and the three
/// indices that point into it.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    pub(crate) store: RecordStore,
    pub(crate) names: NameIndex,
    pub(crate) regions: RegionIndex,
    pub(crate) capabilities: CapabilityIndex,
}

impl EntityIndex {
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn names(&self) -> &NameIndex {
        &self.names
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    pub fn capabilities(&self) -> &CapabilityIndex {
        &self.capabilities
    }

    /// Verify that every identifier in every index resolves in the store.
    pub fn check_integrity(&self) -> Result<()> {
        fn check<D: IndexDefinition>(index: &PostingIndex<D>, store: &RecordStore) -> Result<()> {
            match index.identifiers().find(|(_, id)| !store.contains(id)) {
                Some((key, id)) => Err(IndexError::DanglingIdentifier {
                    index: index.definition.name(),
                    key: key.to_string(),
                    uei: id.to_string(),
                }),
                None => Ok(()),
            }
        }
        check(&self.names, &self.store)?;
        check(&self.regions, &self.store)?;
        check(&self.capabilities, &self.store)
    }
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum IndexError {
        #[error("Index '{index}' key '{key}' references unknown entity '{uei}'")]
        DanglingIdentifier {
            index: &'static str,
            key: String,
            uei: String,
        },
    }
    pub type Result<T> = std::result::Result<T, IndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PhysicalAddress;

    fn record(uei: &str, name: &str, region: &str, capabilities: &[&str]) -> EntityRecord {
        EntityRecord {
            uei: uei.to_string(),
            legal_business_name: name.to_string(),
            physical_address: PhysicalAddress {
                region: region.to_string(),
                ..PhysicalAddress::default()
            },
            capabilities: capabilities.iter().map(ToString::to_string).collect(),
            ..EntityRecord::default()
        }
    }

    #[test]
    fn test_tokenize_splits_lowercases_and_drops_short_words() {
        assert_eq!(
            tokenize("K & K CONSTRUCTION SUPPLY, INC."),
            vec!["construction", "supply", "inc"]
        );
        assert_eq!(tokenize("RIDE ON ST. LOUIS"), vec!["ride", "louis"]);
        assert_eq!(tokenize("snake_case_name"), vec!["snake_case_name"]);
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_treats_non_ascii_as_separator() {
        assert_eq!(tokenize("CAFÉ BUILDERS"), vec!["caf", "builders"]);
    }

    #[test]
    fn test_name_index_keeps_duplicates_in_order() {
        let mut index = NameIndex::default();
        index.index_record(&record("E1", "BUILD BUILD CORP", "", &[]));
        index.index_record(&record("E2", "BUILD RIGHT", "", &[]));

        assert_eq!(index.get("build"), ["E1", "E1", "E2"]);
        assert_eq!(index.get("corp"), ["E1"]);
        assert!(index.get("missing").is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_region_index_normalizes_and_skips_empty() {
        let mut index = RegionIndex::default();
        assert_eq!(index.index_record(&record("E1", "A", " TX ", &[])), 1);
        assert_eq!(index.index_record(&record("E2", "B", "", &[])), 0);

        assert_eq!(index.lookup("tx").collect::<Vec<_>>(), ["E1"]);
        assert_eq!(index.lookup("Tx").collect::<Vec<_>>(), ["E1"]);
        assert_eq!(index.lookup(" tx\t").collect::<Vec<_>>(), ["E1"]);
        assert_eq!(normalize_region(" TX "), "tx");
        assert_eq!(index.lookup("").count(), 0);
    }

    #[test]
    fn test_capability_index_tokenizes_each_phrase() {
        let mut index = CapabilityIndex::default();
        index.index_record(&record(
            "E1",
            "A",
            "",
            &["Road paving", "Site preparation"],
        ));

        assert_eq!(index.get("paving"), ["E1"]);
        assert_eq!(index.get("site"), ["E1"]);
        assert_eq!(index.lookup("ROAD work").collect::<Vec<_>>(), ["E1"]);
    }

    #[test]
    fn test_partial_matches_scan_keys_for_substrings() {
        let mut index = NameIndex::default();
        index.index_record(&record("E1", "CONSTRUCTION EXPERTS", "", &[]));
        index.index_record(&record("E2", "RECONSTRUCTIVE SURGERY", "", &[]));
        index.index_record(&record("E3", "TECH INNOVATIONS", "", &[]));

        let hits = index.partial_matches(&["constr".to_string()]);
        assert_eq!(hits, ["E1", "E2"]);
        assert!(index.partial_matches(&["zzz".to_string()]).is_empty());
    }

    #[test]
    fn test_check_integrity_flags_dangling_identifiers() {
        let mut index = EntityIndex::default();
        let rec = record("E1", "ACME", "TX", &[]);
        index.names.index_record(&rec);
        assert!(matches!(
            index.check_integrity(),
            Err(IndexError::DanglingIdentifier { .. })
        ));

        index.store.insert(rec);
        assert!(index.check_integrity().is_ok());
    }
}
