use ahash::AHashMap as HashMap;

use crate::record::EntityRecord;

/// Identifier → record map. Only the index builder inserts; once a snapshot
/// is published the store is read-only.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: HashMap<String, EntityRecord>,
}

impl RecordStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: HashMap::with_capacity(capacity),
        }
    }

    /// Insert keyed by the record's UEI, returning the record it replaced.
    pub(crate) fn insert(&mut self, record: EntityRecord) -> Option<EntityRecord> {
        self.records.insert(record.uei.clone(), record)
    }

    pub fn get(&self, uei: &str) -> Option<&EntityRecord> {
        self.records.get(uei)
    }

    pub fn contains(&self, uei: &str) -> bool {
        self.records.contains_key(uei)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uei: &str, name: &str) -> EntityRecord {
        EntityRecord {
            uei: uei.to_string(),
            legal_business_name: name.to_string(),
            ..EntityRecord::default()
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = RecordStore::default();
        assert!(store.insert(record("E1", "FIRST")).is_none());
        assert!(store.contains("E1"));
        assert_eq!(store.get("E1").unwrap().legal_business_name, "FIRST");
        assert!(store.get("E2").is_none());
    }

    #[test]
    fn test_insert_replaces_same_uei() {
        let mut store = RecordStore::with_capacity(2);
        store.insert(record("E1", "FIRST"));
        let replaced = store.insert(record("E1", "SECOND"));

        assert_eq!(replaced.unwrap().legal_business_name, "FIRST");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("E1").unwrap().legal_business_name, "SECOND");
    }
}
