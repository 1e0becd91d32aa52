//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FaultCodeStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FaultCodeStore, StoreError, StoreResult};
use crate::storage::{FaultCodeRecord, RecordField};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RECORD_COLUMNS: &str = "code, title, full_content, symptoms, causes, solutions, \
                              special_notes, technical_info";

/// SQLite record store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the store at `path`
    ///
    /// WAL journaling lets lookups on other connections read while a crawl
    /// is committing records.
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Flushes the write-ahead log into the main database file
    ///
    /// Called before the database file is copied or compressed.
    pub fn checkpoint(&self) -> StoreResult<()> {
        self.conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<FaultCodeRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let records = stmt
            .query_map(params, record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FaultCodeRecord> {
    Ok(FaultCodeRecord {
        code: row.get(0)?,
        title: row.get(1)?,
        full_content: row.get(2)?,
        symptoms: row.get(3)?,
        causes: row.get(4)?,
        solutions: row.get(5)?,
        special_notes: row.get(6)?,
        technical_info: row.get(7)?,
    })
}

impl FaultCodeStore for SqliteStore {
    fn upsert(&mut self, record: &FaultCodeRecord) -> StoreResult<()> {
        let code = FaultCodeRecord::normalize_code(&record.code);
        if code.is_empty() {
            return Err(StoreError::InvalidRecord(
                "fault code cannot be empty".to_string(),
            ));
        }

        // One statement per record inside its own transaction: readers see
        // either the previous row or the complete new one.
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO fault_codes
                (code, title, full_content, symptoms, causes, solutions, special_notes, technical_info)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(code) DO UPDATE SET
                title = excluded.title,
                full_content = excluded.full_content,
                symptoms = excluded.symptoms,
                causes = excluded.causes,
                solutions = excluded.solutions,
                special_notes = excluded.special_notes,
                technical_info = excluded.technical_info",
            params![
                code,
                record.title,
                record.full_content,
                record.symptoms,
                record.causes,
                record.solutions,
                record.special_notes,
                record.technical_info,
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn get_by_code(&self, code: &str) -> StoreResult<Option<FaultCodeRecord>> {
        let code = FaultCodeRecord::normalize_code(code);
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM fault_codes WHERE code = ?1", RECORD_COLUMNS),
                params![code],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn get_by_code_substring(&self, fragment: &str) -> StoreResult<Vec<FaultCodeRecord>> {
        // instr() keeps '%' and '_' in the fragment literal
        self.query_records(
            &format!(
                "SELECT {} FROM fault_codes WHERE instr(code, ?1) > 0 ORDER BY code",
                RECORD_COLUMNS
            ),
            params![fragment],
        )
    }

    fn get_by_code_suffix(
        &self,
        suffix: &str,
        limit: usize,
    ) -> StoreResult<Vec<FaultCodeRecord>> {
        if suffix.is_empty() {
            return Ok(Vec::new());
        }

        self.query_records(
            &format!(
                "SELECT {} FROM fault_codes
                 WHERE length(code) >= length(?1) AND substr(code, -length(?1)) = ?1
                 ORDER BY code LIMIT ?2",
                RECORD_COLUMNS
            ),
            params![suffix, limit as i64],
        )
    }

    fn count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fault_codes", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_populated(&self, field: RecordField) -> StoreResult<u64> {
        let column = field.column();
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM fault_codes WHERE {} IS NOT NULL AND {} != ''",
                column, column
            ),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_content_containing(&self, needle: &str) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM fault_codes WHERE instr(full_content, ?1) > 0",
            params![needle],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn sample_with_content(&self) -> StoreResult<Option<FaultCodeRecord>> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM fault_codes
                     WHERE full_content IS NOT NULL AND full_content != ''
                     ORDER BY code LIMIT 1",
                    RECORD_COLUMNS
                ),
                [],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }
}
