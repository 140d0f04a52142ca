//! Typed entity records.
//!
//! Raw rows are converted into [`EntityRecord`]s as soon as they reach the
//! core; nothing downstream of [`EntityRecord::from_raw`] touches column names.

use samsearch_data_processing::{RawRow, columns, split_capability_narrative};

/// Identifier of the "index still building" sentinel.
pub const LOADING_ID: &str = "LOADING";
/// Identifier of the "index unavailable" sentinel.
pub const ERROR_ID: &str = "ERROR";

/// Identifiers that can never belong to a real record.
pub const RESERVED_IDS: [&str; 2] = [LOADING_ID, ERROR_ID];

/// Street address of a registered entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysicalAddress {
    pub line1: String,
    pub city: String,
    /// State or province code, e.g. `TX`
    pub region: String,
    pub postal_code: String,
    pub country_code: String,
}

/// A registered organization as held by the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRecord {
    /// Unique entity identifier (UEI)
    pub uei: String,
    pub legal_business_name: String,
    pub physical_address: PhysicalAddress,
    /// Declared capability phrases, trimmed, in narrative order
    pub capabilities: Vec<String>,
    pub registration_status: String,
}

impl EntityRecord {
    /// Build a record from a raw row. Missing fields become empty strings;
    /// the caller decides what to do with an empty identifier.
    pub fn from_raw(row: &RawRow) -> Self {
        let field = |column: &str| row.get_or_empty(column).to_string();
        Self {
            uei: field(columns::UNIQUE_ENTITY_ID),
            legal_business_name: field(columns::LEGAL_BUSINESS_NAME),
            physical_address: PhysicalAddress {
                line1: field(columns::PHYSICAL_ADDRESS_LINE_1),
                city: field(columns::PHYSICAL_ADDRESS_CITY),
                region: field(columns::PHYSICAL_ADDRESS_STATE_OR_PROVINCE_CODE),
                postal_code: field(columns::PHYSICAL_ADDRESS_ZIP_CODE),
                country_code: field(columns::PHYSICAL_ADDRESS_COUNTRY_CODE),
            },
            capabilities: split_capability_narrative(
                row.get_or_empty(columns::CAPABILITY_NARRATIVE),
            ),
            registration_status: field(columns::REGISTRATION_STATUS),
        }
    }

    pub(crate) fn loading() -> Self {
        Self {
            uei: LOADING_ID.to_string(),
            legal_business_name: "Loading SAM data. Please wait...".to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            uei: ERROR_ID.to_string(),
            legal_business_name: "SAM data could not be loaded. Please check server logs."
                .to_string(),
            ..Self::default()
        }
    }

    /// Whether this is one of the loading / unavailable placeholders rather
    /// than a real entity.
    pub fn is_sentinel(&self) -> bool {
        is_reserved_id(&self.uei)
    }

    pub fn region(&self) -> &str {
        &self.physical_address.region
    }
}

pub fn is_reserved_id(id: &str) -> bool {
    RESERVED_IDS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_full_row() {
        let row = RawRow::new()
            .with(columns::UNIQUE_ENTITY_ID, "E1")
            .with(columns::LEGAL_BUSINESS_NAME, "CONSTRUCTION EXPERTS CORP")
            .with(columns::PHYSICAL_ADDRESS_LINE_1, "789 BUILDER WAY")
            .with(columns::PHYSICAL_ADDRESS_CITY, "DALLAS")
            .with(columns::PHYSICAL_ADDRESS_STATE_OR_PROVINCE_CODE, "TX")
            .with(columns::PHYSICAL_ADDRESS_ZIP_CODE, "75201")
            .with(columns::PHYSICAL_ADDRESS_COUNTRY_CODE, "USA")
            .with(columns::CAPABILITY_NARRATIVE, "Concrete work; Site prep")
            .with(columns::REGISTRATION_STATUS, "A");

        let record = EntityRecord::from_raw(&row);
        assert_eq!(record.uei, "E1");
        assert_eq!(record.region(), "TX");
        assert_eq!(record.physical_address.postal_code, "75201");
        assert_eq!(record.capabilities, vec!["Concrete work", "Site prep"]);
        assert_eq!(record.registration_status, "A");
        assert!(!record.is_sentinel());
    }

    #[test]
    fn test_from_raw_missing_fields_default_to_empty() {
        let row = RawRow::new().with(columns::LEGAL_BUSINESS_NAME, "NAMELESS");
        let record = EntityRecord::from_raw(&row);
        assert!(record.uei.is_empty());
        assert!(record.region().is_empty());
        assert!(record.capabilities.is_empty());
    }

    #[test]
    fn test_sentinels_use_reserved_ids() {
        assert!(EntityRecord::loading().is_sentinel());
        assert!(EntityRecord::unavailable().is_sentinel());
        assert_eq!(EntityRecord::unavailable().uei, ERROR_ID);
    }
}
