//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::storage::{FaultCodeRecord, RecordField};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for fault-code record stores
///
/// `upsert` is the only write path. Every read is a short, independent query,
/// so readers on separate connections never observe a half-written record.
pub trait FaultCodeStore {
    /// Inserts a record, or fully replaces the record sharing its code
    ///
    /// The code is trimmed and upper-cased before it is written. Fields absent
    /// from `record` are cleared on replace, never carried over.
    fn upsert(&mut self, record: &FaultCodeRecord) -> StoreResult<()>;

    /// Gets a record by its exact code
    fn get_by_code(&self, code: &str) -> StoreResult<Option<FaultCodeRecord>>;

    /// Gets all records whose code contains `fragment`, ordered by code
    fn get_by_code_substring(&self, fragment: &str) -> StoreResult<Vec<FaultCodeRecord>>;

    /// Gets up to `limit` records whose code ends with `suffix`, ordered by code
    fn get_by_code_suffix(&self, suffix: &str, limit: usize)
        -> StoreResult<Vec<FaultCodeRecord>>;

    /// Counts stored records
    fn count(&self) -> StoreResult<u64>;

    // ===== Statistics =====

    /// Counts records whose `field` is non-null and non-empty
    fn count_populated(&self, field: RecordField) -> StoreResult<u64>;

    /// Counts records whose full content contains `needle`
    fn count_content_containing(&self, needle: &str) -> StoreResult<u64>;

    /// Returns one record with non-empty full content, if any
    fn sample_with_content(&self) -> StoreResult<Option<FaultCodeRecord>>;
}
