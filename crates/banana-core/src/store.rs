//! Record store
//!
//! The `Store` owns the single SQLite connection behind the store file and
//! exposes durable CRUD over any [`Record`] table.
//!
//! ## Handle lifecycle
//!
//! ```text
//! Closed --open/reopen--> Open --close (import only)--> Closed
//! ```
//!
//! Row operations against a closed handle are a programming error; they
//! return [`StorageError::Closed`] instead of touching the disk.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open_with_config(config)?;
//!
//! let note: Note = store.insert("Buy milk")?;
//! store.update::<Note>(note.id, "Buy oat milk")?;
//!
//! let notes: Vec<Note> = store.load_all()?;
//! ```

use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{Image, Note, Record};
use crate::storage::persistence::ensure_dir;
use crate::storage::schema::ensure_table;
use crate::storage::{StorageError, StorageResult, StorageStats};

/// State of the store handle
pub enum StoreState {
    Open(Connection),
    Closed,
}

/// Owned handle to the store file
pub struct Store {
    state: StoreState,
    config: Config,
}

impl Store {
    /// Open the store with a specific configuration
    ///
    /// Creates the store directory and file if missing, then makes sure every
    /// entity table exists.
    pub fn open_with_config(config: Config) -> StorageResult<Self> {
        let conn = open_connection(&config)?;
        Ok(Self {
            state: StoreState::Open(conn),
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Canonical path of the store file
    pub fn path(&self) -> PathBuf {
        self.config.store_path()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, StoreState::Open(_))
    }

    /// Close the handle
    ///
    /// On failure the handle stays open.
    pub fn close(&mut self) -> StorageResult<()> {
        match std::mem::replace(&mut self.state, StoreState::Closed) {
            StoreState::Open(conn) => match conn.close() {
                Ok(()) => {
                    debug!("Closed store at {:?}", self.path());
                    Ok(())
                }
                Err((conn, e)) => {
                    self.state = StoreState::Open(conn);
                    Err(e.into())
                }
            },
            StoreState::Closed => Ok(()),
        }
    }

    /// Close (if open) and open the store file again at the canonical path
    pub fn reopen(&mut self) -> StorageResult<()> {
        self.close()?;
        let conn = open_connection(&self.config)?;
        self.state = StoreState::Open(conn);
        info!("Reopened store at {:?}", self.path());
        Ok(())
    }

    /// Create the table for `R` if it does not exist
    pub fn ensure_schema<R: Record>(&self) -> StorageResult<()> {
        ensure_table::<R>(self.conn()?)?;
        Ok(())
    }

    // ==================== Row Operations ====================

    /// All rows of `R`'s table in insertion order
    pub fn load_all<R: Record>(&self) -> StorageResult<Vec<R>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, {} FROM {} ORDER BY id ASC",
            R::PAYLOAD_COLUMN,
            R::TABLE
        ))?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let payload: Option<String> = row.get(1)?;
            Ok(R::from_row(id, payload.unwrap_or_default()))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        debug!("Loaded {} rows from {}", records.len(), R::TABLE);
        Ok(records)
    }

    /// Get one row by id
    pub fn get<R: Record>(&self, id: i64) -> StorageResult<Option<R>> {
        let record = self
            .conn()?
            .query_row(
                &format!(
                    "SELECT id, {} FROM {} WHERE id = ?1",
                    R::PAYLOAD_COLUMN,
                    R::TABLE
                ),
                params![id],
                |row| {
                    let payload: Option<String> = row.get(1)?;
                    Ok(R::from_row(row.get(0)?, payload.unwrap_or_default()))
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Insert a new row and return it with its assigned id
    pub fn insert<R: Record>(&mut self, payload: &str) -> StorageResult<R> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1)",
                R::TABLE,
                R::PAYLOAD_COLUMN
            ),
            params![payload],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!("Inserted {} row {}", R::TABLE, id);
        Ok(R::from_row(id, payload.to_string()))
    }

    /// Replace the payload of row `id`
    ///
    /// Returns `false` when no row has that id.
    pub fn update<R: Record>(&mut self, id: i64, payload: &str) -> StorageResult<bool> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction()?;
        let affected = tx.execute(
            &format!(
                "UPDATE {} SET {} = ?1 WHERE id = ?2",
                R::TABLE,
                R::PAYLOAD_COLUMN
            ),
            params![payload, id],
        )?;
        tx.commit()?;

        debug!("Updated {} row {} ({} affected)", R::TABLE, id, affected);
        Ok(affected > 0)
    }

    /// Delete row `id`
    ///
    /// Returns `false` when no row has that id.
    pub fn delete<R: Record>(&mut self, id: i64) -> StorageResult<bool> {
        let conn = self.conn_mut()?;
        let tx = conn.transaction()?;
        let affected = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", R::TABLE),
            params![id],
        )?;
        tx.commit()?;

        debug!("Deleted {} row {} ({} affected)", R::TABLE, id, affected);
        Ok(affected > 0)
    }

    /// Number of rows in `R`'s table
    pub fn count<R: Record>(&self) -> StorageResult<i64> {
        let count = self.conn()?.query_row(
            &format!("SELECT COUNT(*) FROM {}", R::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ==================== Stats ====================

    /// Size information about the store file and its import backup
    pub fn storage_stats(&self) -> StorageStats {
        StorageStats::collect(&self.config.store_path(), &self.config.backup_path())
    }

    fn conn(&self) -> StorageResult<&Connection> {
        match &self.state {
            StoreState::Open(conn) => Ok(conn),
            StoreState::Closed => Err(StorageError::Closed {
                path: self.config.store_path(),
            }),
        }
    }

    fn conn_mut(&mut self) -> StorageResult<&mut Connection> {
        match &mut self.state {
            StoreState::Open(conn) => Ok(conn),
            StoreState::Closed => Err(StorageError::Closed {
                path: self.config.store_path(),
            }),
        }
    }
}

/// Open a connection at the configured path and create missing tables
///
/// Table creation failures are logged, not returned: the store still opens,
/// and operations on the affected table fail individually.
fn open_connection(config: &Config) -> StorageResult<Connection> {
    ensure_dir(&config.store_dir())?;

    let path = config.store_path();
    let conn = Connection::open(&path)?;
    info!("Opened store at {:?}", path);

    if let Err(e) = ensure_table::<Note>(&conn) {
        warn!("Failed to create {} table: {}", Note::TABLE, e);
    }
    if let Err(e) = ensure_table::<Image>(&conn) {
        warn!("Failed to create {} table: {}", Image::TABLE, e);
    }

    Ok(conn)
}
