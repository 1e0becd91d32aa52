//! Storage module for persisting fault-code records
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Atomic upsert of extracted records keyed by code
//! - Exact, substring, and suffix lookups on the code key
//! - Aggregate counts used by statistics and snapshot metadata

mod schema;
mod sqlite;
mod traits;

pub use schema::{get_schema_version, initialize_schema};
pub use sqlite::SqliteStore;
pub use traits::{FaultCodeStore, StoreError, StoreResult};

use serde::Serialize;
use std::path::Path;

/// Opens (or creates) the record store at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully opened store
/// * `Err(StoreError)` - Failed to open or initialize the database
pub fn open_store(path: &Path) -> StoreResult<SqliteStore> {
    SqliteStore::new(path)
}

/// One fault code and everything extracted from its detail page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FaultCodeRecord {
    /// Unique key, upper-cased on write
    pub code: String,
    pub title: Option<String>,
    pub full_content: Option<String>,
    pub symptoms: Option<String>,
    pub causes: Option<String>,
    pub solutions: Option<String>,
    pub special_notes: Option<String>,
    pub technical_info: Option<String>,
}

impl FaultCodeRecord {
    /// Creates a record with only its key set
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Normalizes a code the way the store keys it
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Returns the value of an optional text field
    pub fn field(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Title => self.title.as_deref(),
            RecordField::FullContent => self.full_content.as_deref(),
            RecordField::Symptoms => self.symptoms.as_deref(),
            RecordField::Causes => self.causes.as_deref(),
            RecordField::Solutions => self.solutions.as_deref(),
            RecordField::SpecialNotes => self.special_notes.as_deref(),
            RecordField::TechnicalInfo => self.technical_info.as_deref(),
        }
    }

    /// Labels of the section fields that carry text, in display order
    pub fn available_sections(&self) -> Vec<&'static str> {
        [
            RecordField::Symptoms,
            RecordField::Causes,
            RecordField::Solutions,
            RecordField::SpecialNotes,
            RecordField::TechnicalInfo,
            RecordField::FullContent,
        ]
        .into_iter()
        .filter(|field| self.field(*field).is_some_and(|text| !text.is_empty()))
        .map(RecordField::short_label)
        .collect()
    }
}

/// The optional text columns of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Title,
    FullContent,
    Symptoms,
    Causes,
    Solutions,
    SpecialNotes,
    TechnicalInfo,
}

impl RecordField {
    /// Every optional column, in schema order
    pub const ALL: [RecordField; 7] = [
        Self::Title,
        Self::FullContent,
        Self::Symptoms,
        Self::Causes,
        Self::Solutions,
        Self::SpecialNotes,
        Self::TechnicalInfo,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::FullContent => "full_content",
            Self::Symptoms => "symptoms",
            Self::Causes => "causes",
            Self::Solutions => "solutions",
            Self::SpecialNotes => "special_notes",
            Self::TechnicalInfo => "technical_info",
        }
    }

    /// Heading used when rendering the field
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::FullContent => "Complete Information",
            Self::Symptoms => "Possible Symptoms",
            Self::Causes => "Possible Causes",
            Self::Solutions => "Possible Solutions",
            Self::SpecialNotes => "Special Notes",
            Self::TechnicalInfo => "Technical Information",
        }
    }

    /// Compact name used in match previews
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::FullContent => "Full Content",
            Self::Symptoms => "Symptoms",
            Self::Causes => "Causes",
            Self::Solutions => "Solutions",
            Self::SpecialNotes => "Special Notes",
            Self::TechnicalInfo => "Technical Info",
        }
    }
}
