//! SQLite schema for the record tables
//!
//! Every entity gets one table of the form
//! `(id INTEGER PRIMARY KEY AUTOINCREMENT, <payload> TEXT)`. Tables are
//! created lazily and idempotently; there are no migrations.

use rusqlite::{Connection, Result};

use crate::models::{Image, Note, Record};

/// First 16 bytes of every SQLite database file
pub const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Create the table for `R` if it does not exist yet
pub fn ensure_table<R: Record>(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {column} TEXT
        );",
        table = R::TABLE,
        column = R::PAYLOAD_COLUMN,
    ))
}

/// Check whether a table exists
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?")?
        .exists([table])
}

/// List a table's column names in declaration order
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?) ORDER BY cid")?;
    let columns = stmt
        .query_map([table], |row| row.get(0))?
        .collect::<Result<Vec<String>>>()?;
    Ok(columns)
}

/// Whether a byte blob starts with the SQLite file header
pub fn has_sqlite_header(bytes: &[u8]) -> bool {
    bytes.len() >= SQLITE_HEADER.len() && &bytes[..SQLITE_HEADER.len()] == SQLITE_HEADER
}

/// Structural check of a candidate store
///
/// The notes table is required. The images table is optional (older stores
/// only carried notes) but must have the right columns when present.
/// Returns a description of the first problem found.
pub fn validate_store(conn: &Connection) -> std::result::Result<(), String> {
    let integrity: String = conn
        .query_row("PRAGMA quick_check", [], |row| row.get(0))
        .map_err(|e| format!("integrity check failed: {}", e))?;
    if integrity != "ok" {
        return Err(format!("integrity check failed: {}", integrity));
    }

    check_table::<Note>(conn, true)?;
    check_table::<Image>(conn, false)?;
    Ok(())
}

fn check_table<R: Record>(conn: &Connection, required: bool) -> std::result::Result<(), String> {
    let exists = table_exists(conn, R::TABLE).map_err(|e| e.to_string())?;
    if !exists {
        return if required {
            Err(format!("missing table '{}'", R::TABLE))
        } else {
            Ok(())
        };
    }

    let columns = table_columns(conn, R::TABLE).map_err(|e| e.to_string())?;
    for expected in ["id", R::PAYLOAD_COLUMN] {
        if !columns.iter().any(|c| c == expected) {
            return Err(format!(
                "table '{}' has no '{}' column",
                R::TABLE,
                expected
            ));
        }
    }
    Ok(())
}
