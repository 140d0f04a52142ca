//! Basic entity search
//!
//! Builds the index from the extract named by `SAM_DATA_PATH` when it exists,
//! otherwise from a generated sample extract, then runs a few searches.
//!
//! ```sh
//! SAM_DATA_PATH=./public/extract.dat SAM_MAX_ROWS=20000 cargo run --example basic_search
//! ```

use samsearch::{
    EntitySearchService, IngestConfig, SearchConfigBuilder, SearchFilters, SearchResponse,
};
use samsearch::data_processing::{DATA_PATH, TestDataConfig, create_test_data};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    samsearch::init_logging(tracing::Level::INFO)?;

    // Keep the sample file alive until the build has read it
    let sample;
    let config = if DATA_PATH.is_file() {
        IngestConfig::default()
    } else {
        println!("{} not found, using sample data", DATA_PATH.display());
        sample = create_test_data(&TestDataConfig::sample())?;
        IngestConfig::new(sample.path())
    };

    let service = EntitySearchService::new();
    service.build_from_csv(config);
    if let Some(err) = service.failure() {
        return Err(format!("index build failed: {err}").into());
    }
    if let Some(summary) = service.summary() {
        println!(
            "Indexed {} entities ({} skipped) in {:?}",
            summary.records_indexed, summary.rows_skipped, summary.elapsed
        );
    }

    println!("\nSearching for 'construction':");
    print_response(&service.search("construction", &SearchFilters::new()), 5);

    println!("\nSearching for 'builders' in TX:");
    print_response(&service.search("builders", &SearchFilters::new().region("TX")), 5);

    println!("\nEntities offering concrete work:");
    print_response(&service.search("", &SearchFilters::new().capability("concrete")), 5);

    println!("\nStrict search for 'constr' (no partial matching):");
    let strict = SearchConfigBuilder::strict().limit(10).build();
    print_response(
        &service.search_with_config("constr", &SearchFilters::new(), &strict),
        5,
    );

    Ok(())
}

fn print_response(response: &SearchResponse, limit: usize) {
    let records = response.records();
    if records.is_empty() {
        println!("  no matches");
        return;
    }
    for (i, record) in records.iter().take(limit).enumerate() {
        println!(
            "  {}. {} [{}] {}, {}",
            i + 1,
            record.legal_business_name,
            record.uei,
            record.physical_address.city,
            record.region()
        );
    }
    if records.len() > limit {
        println!("  ... and {} more results", records.len() - limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_search_example() {
        assert!(main().is_ok(), "Basic search example should run successfully");
    }
}
