//! Statistics generation from the record store
//!
//! This module provides functionality for summarizing what a harvest has
//! put into the store, and for displaying that summary.

use crate::storage::{FaultCodeRecord, FaultCodeStore, RecordField};
use crate::HarvestError;

/// Marker text carried by records imported from the PDF code list
pub const PDF_SOURCE_MARKER: &str = "extracted from the VAG fault codes PDF";

/// Marker text carried by records harvested from the wiki
pub const WIKI_SOURCE_MARKER: &str = "Possible Symptoms";

/// Length of the full-content preview printed for the sample record
const SAMPLE_PREVIEW_CHARS: usize = 500;

/// Database statistics summary
#[derive(Debug, Clone)]
pub struct DatabaseStatistics {
    /// Total number of stored codes
    pub total_codes: u64,

    /// Codes with non-empty full content
    pub enhanced_codes: u64,

    /// Populated count per optional field, in schema order
    pub populated: Vec<(RecordField, u64)>,

    /// Records whose content came from the PDF list
    pub pdf_codes: u64,

    /// Records whose content came from the wiki
    pub wiki_codes: u64,

    /// One record with content, for eyeballing extraction quality
    pub sample: Option<FaultCodeRecord>,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The record store to query
///
/// # Returns
///
/// * `Ok(DatabaseStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics<S: FaultCodeStore + ?Sized>(
    store: &S,
) -> Result<DatabaseStatistics, HarvestError> {
    let total_codes = store.count()?;

    let mut populated = Vec::with_capacity(RecordField::ALL.len());
    for field in RecordField::ALL {
        populated.push((field, store.count_populated(field)?));
    }

    let enhanced_codes = populated
        .iter()
        .find(|(field, _)| *field == RecordField::FullContent)
        .map(|(_, count)| *count)
        .unwrap_or(0);

    Ok(DatabaseStatistics {
        total_codes,
        enhanced_codes,
        populated,
        pdf_codes: store.count_content_containing(PDF_SOURCE_MARKER)?,
        wiki_codes: store.count_content_containing(WIKI_SOURCE_MARKER)?,
        sample: store.sample_with_content()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatabaseStatistics) {
    println!("=== Database Statistics ===\n");

    println!("Overview:");
    println!("  Total fault codes: {}", stats.total_codes);
    println!("  Enhanced fault codes: {}", stats.enhanced_codes);
    println!("  PDF codes: {}", stats.pdf_codes);
    println!("  Ross-Tech codes: {}", stats.wiki_codes);
    println!();

    println!("Fields Populated:");
    for (field, count) in &stats.populated {
        let percentage = if stats.total_codes > 0 {
            (*count as f64 / stats.total_codes as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", field.label(), count, percentage);
    }
    println!();

    match &stats.sample {
        Some(record) => print_sample(record),
        None => println!(
            "No enhanced data found yet. Run the harvester to populate the content fields."
        ),
    }
}

fn print_sample(record: &FaultCodeRecord) {
    println!("Sample Record:");
    println!("  Fault Code: {}", record.code);
    println!("  Title: {}", record.title.as_deref().unwrap_or(""));

    if let Some(content) = record.full_content.as_deref() {
        let preview: String = content.chars().take(SAMPLE_PREVIEW_CHARS).collect();
        println!("  Full Content Length: {} characters", content.chars().count());
        println!("  Full Content Preview: {}...", preview);
    }

    for field in [
        RecordField::Symptoms,
        RecordField::Causes,
        RecordField::Solutions,
        RecordField::SpecialNotes,
        RecordField::TechnicalInfo,
    ] {
        if let Some(text) = record.field(field).filter(|text| !text.is_empty()) {
            println!("  {}: {}", field.short_label(), text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    #[test]
    fn test_statistics_on_empty_store() {
        let store = SqliteStore::new_in_memory().unwrap();
        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_codes, 0);
        assert_eq!(stats.enhanced_codes, 0);
        assert!(stats.sample.is_none());
        assert_eq!(stats.populated.len(), RecordField::ALL.len());
    }

    #[test]
    fn test_statistics_counts_sources_and_fields() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let mut wiki = FaultCodeRecord::new("00532");
        wiki.full_content = Some("Possible Symptoms\nRough idle".to_string());
        wiki.symptoms = Some("Rough idle".to_string());
        store.upsert(&wiki).unwrap();

        let mut pdf = FaultCodeRecord::new("16485");
        pdf.full_content = Some(format!("Mass air flow sensor, {}", PDF_SOURCE_MARKER));
        store.upsert(&pdf).unwrap();

        store.upsert(&FaultCodeRecord::new("01314")).unwrap();

        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_codes, 3);
        assert_eq!(stats.enhanced_codes, 2);
        assert_eq!(stats.pdf_codes, 1);
        assert_eq!(stats.wiki_codes, 1);
        assert!(stats
            .populated
            .contains(&(RecordField::Symptoms, 1)));
        assert_eq!(stats.sample.map(|r| r.code), Some("00532".to_string()));
    }
}
