//! Database schema definitions and migrations
//!
//! This module contains the SQL schema for the fault-code store.

use rusqlite::Connection;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS fault_codes (
    code TEXT PRIMARY KEY NOT NULL,
    title TEXT,
    full_content TEXT,
    symptoms TEXT,
    causes TEXT,
    solutions TEXT,
    special_notes TEXT,
    technical_info TEXT
);
"#;

/// Columns added after the first published database layout
const LATER_COLUMNS: &[&str] = &["full_content", "special_notes", "technical_info"];

/// Initializes the database schema
///
/// Databases written by older harvests lack the later text columns; they are
/// added in place so existing rows survive.
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    add_missing_columns(conn)?;
    Ok(())
}

fn add_missing_columns(conn: &Connection) -> Result<(), rusqlite::Error> {
    let existing = {
        let mut stmt = conn.prepare("PRAGMA table_info(fault_codes)")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        names
    };

    for column in LATER_COLUMNS {
        if !existing.iter().any(|name| name == column) {
            conn.execute_batch(&format!("ALTER TABLE fault_codes ADD COLUMN {} TEXT", column))?;
            tracing::info!("Added {} column", column);
        }
    }

    Ok(())
}

/// Gets the current schema version
///
/// Written into snapshot metadata so consumers can tell which column layout
/// a snapshot carries.
pub fn get_schema_version() -> u32 {
    2
}
