use std::io::Write;

use tempfile::NamedTempFile;
use tracing::info;

use super::error::Result;
use super::row::{RawRow, columns};

/// Configuration for sample extract generation
#[derive(Debug, Clone)]
pub struct TestDataConfig {
    /// Number of entity rows to write (capped at the size of the sample corpus)
    pub rows: usize,
    /// Whether to fill in `CAPABILITY_NARRATIVE`
    pub with_capabilities: bool,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self::sample()
    }
}

impl TestDataConfig {
    /// Minimal data for unit tests
    pub fn minimal() -> Self {
        Self {
            rows: 3,
            with_capabilities: true,
        }
    }

    /// The whole sample corpus
    pub fn sample() -> Self {
        Self {
            rows: SAMPLE_ENTITIES.len(),
            with_capabilities: true,
        }
    }
}

struct SampleEntity {
    uei: &'static str,
    name: &'static str,
    line1: &'static str,
    city: &'static str,
    state: &'static str,
    zip: &'static str,
    capabilities: &'static str,
    status: &'static str,
}

const SAMPLE_ENTITIES: [SampleEntity; 12] = [
    SampleEntity {
        uei: "C111FE1IJKL4",
        name: "CONSTRUCTION EXPERTS CORP",
        line1: "789 BUILDER WAY",
        city: "DALLAS",
        state: "TX",
        zip: "75201",
        capabilities: "General construction; Concrete work",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE1QRST9",
        name: "PRECISION BUILDERS LLC",
        line1: "123 FOUNDATION AVE",
        city: "ATLANTA",
        state: "GA",
        zip: "30301",
        capabilities: "Residential framing; Roofing",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE1UVWX0",
        name: "METRO CONSTRUCTION SERVICES",
        line1: "456 DEVELOPMENT BLVD",
        city: "HOUSTON",
        state: "TX",
        zip: "77001",
        capabilities: "Road paving; Site preparation",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE1YZ123",
        name: "LANDMARK CONSTRUCTION GROUP INC",
        line1: "789 ARCHITECTURE DR",
        city: "NEW YORK",
        state: "NY",
        zip: "10001",
        capabilities: "Commercial construction; Project management",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE14567",
        name: "ADVANCED INFRASTRUCTURE SOLUTIONS",
        line1: "321 ENGINEERING WAY",
        city: "LOS ANGELES",
        state: "CA",
        zip: "90001",
        capabilities: "Bridge engineering; Civil engineering",
        status: "A",
    },
    SampleEntity {
        uei: "C111ATT311C8",
        name: "K & K CONSTRUCTION SUPPLY INC",
        line1: "11400 WHITE ROCK RD",
        city: "RANCHO CORDOVA",
        state: "CA",
        zip: "95742",
        capabilities: "Building materials; Equipment rental",
        status: "A",
    },
    SampleEntity {
        uei: "C111BG66D155",
        name: "NEW ADVANCES FOR PEOPLE WITH DISABILITIES",
        line1: "3400 N SILLECT AVE",
        city: "BAKERSFIELD",
        state: "CA",
        zip: "93308",
        capabilities: "Vocational training; Community services",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE1KRJF1",
        name: "RIDE ON ST. LOUIS, INC.",
        line1: "5 N LAKE DR",
        city: "HILLSBORO",
        state: "MO",
        zip: "63050",
        capabilities: "Therapeutic riding",
        status: "E",
    },
    SampleEntity {
        uei: "C111FE1ABCD2",
        name: "TECH INNOVATIONS LLC",
        line1: "123 TECH BOULEVARD",
        city: "SAN FRANCISCO",
        state: "CA",
        zip: "94107",
        capabilities: "Software development; Cloud hosting",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE1EFGH3",
        name: "HEALTHCARE PARTNERS INC",
        line1: "456 MEDICAL CENTER DR",
        city: "BOSTON",
        state: "MA",
        zip: "02115",
        capabilities: "Medical staffing; Health IT",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE1MNOP5",
        name: "CONSULTING SERVICES GROUP",
        line1: "321 ADVISOR STREET",
        city: "CHICAGO",
        state: "IL",
        zip: "60601",
        capabilities: "Management consulting; Software development",
        status: "A",
    },
    SampleEntity {
        uei: "C111FE1LMNO7",
        name: "Precision Builders of Texas",
        line1: "900 MAIN ST",
        city: "AUSTIN",
        state: "TX",
        zip: "73301",
        capabilities: "Residential framing; Concrete work",
        status: "A",
    },
];

impl SampleEntity {
    fn values(&self, with_capabilities: bool) -> [&'static str; 9] {
        [
            self.uei,
            self.name,
            self.line1,
            self.city,
            self.state,
            self.zip,
            "USA",
            if with_capabilities {
                self.capabilities
            } else {
                ""
            },
            self.status,
        ]
    }
}

/// The sample corpus as in-memory raw rows, in the same order the file
/// generator writes them.
pub fn sample_rows(config: &TestDataConfig) -> Vec<RawRow> {
    SAMPLE_ENTITIES
        .iter()
        .take(config.rows)
        .map(|entity| {
            columns::ALL
                .into_iter()
                .zip(entity.values(config.with_capabilities))
                .collect()
        })
        .collect()
}

/// Write the sample corpus to a temporary comma-separated file with a header
/// row. Every field is quoted since several legal names contain commas.
pub fn create_test_data(config: &TestDataConfig) -> Result<NamedTempFile> {
    info!("Creating test data with config: {:?}", config);

    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", columns::ALL.join(","))?;
    for entity in SAMPLE_ENTITIES.iter().take(config.rows) {
        let line = entity
            .values(config.with_capabilities)
            .iter()
            .map(|value| quote(value))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(file)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rows_match_config() {
        let rows = sample_rows(&TestDataConfig::minimal());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get(columns::UNIQUE_ENTITY_ID), Some("C111FE1QRST9"));

        let bare = sample_rows(&TestDataConfig {
            rows: 1,
            with_capabilities: false,
        });
        assert_eq!(bare[0].get(columns::CAPABILITY_NARRATIVE), Some(""));
    }

    #[test]
    fn test_rows_capped_at_corpus_size() {
        let rows = sample_rows(&TestDataConfig {
            rows: 1000,
            with_capabilities: true,
        });
        assert_eq!(rows.len(), SAMPLE_ENTITIES.len());
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(quote("A \"B\" C"), "\"A \"\"B\"\" C\"");
    }
}
