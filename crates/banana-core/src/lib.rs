//! Banana Book Core Library
//!
//! This crate provides the core functionality for Banana Book, a local
//! notebook of short text notes and photo references kept in a single
//! SQLite file that can be exported and imported whole.
//!
//! # Architecture
//!
//! - **Store**: one SQLite file, one table per record type, the source of truth
//! - **View caches**: in-memory copies of each table, moved only after the
//!   store reported success
//! - **Session worker**: serialises every operation, including whole-store
//!   import, behind an async handle
//!
//! # Quick Start
//!
//! ```text
//! let session = Session::open(Config::load()?)?;
//! let handle = spawn_session_worker(session, surfaces);
//!
//! handle.add_note(NoteText::new("Buy milk")?).await?;
//! let notes = handle.notes().await?;
//! for note in notes.display() { ... }
//! ```
//!
//! # Modules
//!
//! - `store`: SQLite record store (CRUD, open/close lifecycle)
//! - `cache`: View caches mirroring store tables
//! - `session`: Store plus caches, the unit every front end drives
//! - `worker`: Background session worker and its async handle
//! - `backup`: Whole-store export and import
//! - `surfaces`: Traits for permission, picker, share and camera prompts
//! - `models`: Note and image records, note text validation
//! - `storage`: Schema, file helpers and storage errors
//! - `config`: Application configuration

pub mod backup;
pub mod cache;
pub mod config;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;
pub mod surfaces;
pub mod worker;

#[cfg(test)]
mod testing;

pub use backup::{BackupError, ExportOutcome, ImportOutcome};
pub use cache::{Change, ViewCache};
pub use config::{Config, ExportMode};
pub use models::{Image, Note, NoteText, Record, ValidationError, MAX_NOTE_CHARS};
pub use session::{Session, SessionError, SessionResult};
pub use storage::{StorageError, StorageStats};
pub use store::Store;
pub use surfaces::{
    CaptureResult, DirectoryAccess, DirectoryGrant, FilePicker, MediaCapture, Permission,
    PermissionSurface, PickResult, ShareSurface, Surfaces,
};
pub use worker::{spawn_session_worker, SessionHandle, WorkerStatus};
