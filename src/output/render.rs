//! Plain-text rendering of lookup results

use crate::lookup::SearchOutcome;
use crate::storage::{FaultCodeRecord, RecordField};
use std::fmt::Write;

/// Full content at or below this length duplicates the sections and is skipped
const MIN_FULL_CONTENT_CHARS: usize = 100;

/// Full content is cut at this length for display
const MAX_FULL_CONTENT_CHARS: usize = 1500;

/// Sections printed after the full content, in display order
const DISPLAY_SECTIONS: [RecordField; 5] = [
    RecordField::Symptoms,
    RecordField::Causes,
    RecordField::Solutions,
    RecordField::SpecialNotes,
    RecordField::TechnicalInfo,
];

/// Renders any search outcome for `query`
pub fn render_outcome(outcome: &SearchOutcome, query: &str) -> String {
    match outcome {
        SearchOutcome::SingleMatch(record) => render_record(record),
        SearchOutcome::MultipleMatches { records, note } => {
            render_matches(records, query, note.as_deref())
        }
        SearchOutcome::NoMatch { message } => format!("{}\n", message),
    }
}

/// Renders one record in full
///
/// # Example
///
/// ```
/// use fault_harvest::output::render_record;
/// use fault_harvest::storage::FaultCodeRecord;
///
/// let mut record = FaultCodeRecord::new("00532");
/// record.title = Some("Supply Voltage B+".to_string());
/// record.symptoms = Some("Hard start".to_string());
///
/// let text = render_record(&record);
/// assert!(text.starts_with("Fault Code: 00532\nSupply Voltage B+\n"));
/// assert!(text.contains("Possible Symptoms:\nHard start\n"));
/// ```
pub fn render_record(record: &FaultCodeRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Fault Code: {}", record.code);
    match record.title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => {
            let _ = writeln!(out, "{}\n", title);
        }
        None => out.push('\n'),
    }

    if let Some(content) = record.full_content.as_deref() {
        let length = content.chars().count();
        if length > MIN_FULL_CONTENT_CHARS {
            let _ = writeln!(out, "{}:", RecordField::FullContent.label());
            if length > MAX_FULL_CONTENT_CHARS {
                let cut: String = content.chars().take(MAX_FULL_CONTENT_CHARS).collect();
                let _ = writeln!(out, "{}...\n", cut);
            } else {
                let _ = writeln!(out, "{}\n", content);
            }
        }
    }

    for field in DISPLAY_SECTIONS {
        if let Some(text) = record.field(field).filter(|t| !t.is_empty()) {
            let _ = writeln!(out, "{}:\n{}\n", field.label(), text);
        }
    }

    out
}

/// Renders a numbered list of candidates with a preview of their fields
pub fn render_matches(records: &[FaultCodeRecord], query: &str, note: Option<&str>) -> String {
    let mut out = String::new();

    match note {
        Some(note) => {
            let _ = writeln!(out, "{}\n", note);
        }
        None => {
            let _ = writeln!(out, "Multiple results found for '{}':\n", query);
        }
    }

    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. Fault Code: {}", index + 1, record.code);
        if let Some(title) = record.title.as_deref().filter(|t| !t.is_empty()) {
            let _ = writeln!(out, "   {}", title);
        }

        let available = record.available_sections();
        if !available.is_empty() {
            let _ = writeln!(out, "   Available: {}", available.join(", "));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Found {} results for '{}'", records.len(), query);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_full_content_is_skipped() {
        let mut record = FaultCodeRecord::new("00532");
        record.full_content = Some("short".to_string());

        let text = render_record(&record);
        assert!(!text.contains("Complete Information"));
    }

    #[test]
    fn test_long_full_content_is_truncated() {
        let mut record = FaultCodeRecord::new("00532");
        record.full_content = Some("x".repeat(2000));

        let text = render_record(&record);
        assert!(text.contains("Complete Information:\n"));
        assert!(text.contains(&format!("{}...", "x".repeat(MAX_FULL_CONTENT_CHARS))));
        assert!(!text.contains(&"x".repeat(MAX_FULL_CONTENT_CHARS + 1)));
    }

    #[test]
    fn test_sections_in_display_order() {
        let mut record = FaultCodeRecord::new("00532");
        record.technical_info = Some("5V".to_string());
        record.symptoms = Some("Rough idle".to_string());

        let text = render_record(&record);
        let symptoms = text.find("Possible Symptoms").unwrap();
        let technical = text.find("Technical Information").unwrap();
        assert!(symptoms < technical);
        assert!(!text.contains("Possible Causes"));
    }

    #[test]
    fn test_matches_list_previews_fields() {
        let mut first = FaultCodeRecord::new("P0757");
        first.title = Some("Shift Solenoid B".to_string());
        first.causes = Some("Wiring".to_string());
        first.full_content = Some("Wiring fault".to_string());
        let second = FaultCodeRecord::new("P2757");

        let text = render_matches(&[first, second], "P1757", None);

        assert!(text.starts_with("Multiple results found for 'P1757':\n\n"));
        assert!(text.contains("1. Fault Code: P0757\n   Shift Solenoid B\n   Available: Causes, Full Content\n"));
        assert!(text.contains("2. Fault Code: P2757\n\n"));
        assert!(text.ends_with("Found 2 results for 'P1757'\n"));
    }

    #[test]
    fn test_note_replaces_header() {
        let text = render_matches(&[FaultCodeRecord::new("P0757")], "p1757", Some("similar:"));
        assert!(text.starts_with("similar:\n\n"));
    }

    #[test]
    fn test_no_match_message() {
        let outcome = SearchOutcome::NoMatch {
            message: "No results found for '9Z'.".to_string(),
        };
        assert_eq!(render_outcome(&outcome, "9Z"), "No results found for '9Z'.\n");
    }
}
