//! Whole-store export and import
//!
//! Both directions treat the store file as an opaque blob; no rows are read
//! or merged. Import replaces every table at once.
//!
//! ## Import
//!
//! 1. Permission check, then the user picks a file (cancel is a no-op)
//! 2. The blob is staged next to the store and checked: SQLite header,
//!    integrity, expected tables and columns
//! 3. The store is closed, the current file copied to `<store>.bak`, the
//!    staged file renamed over the store, and the store reopened
//!
//! A file that fails the checks never touches the live store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::config::ExportMode;
use crate::storage::persistence::{commit_rename, ensure_dir, temp_path_for, write_synced};
use crate::storage::schema::{has_sqlite_header, validate_store};
use crate::storage::{atomic_write, read_blob, StorageError};
use crate::store::Store;
use crate::surfaces::{
    ensure_permission, DirectoryAccess, DirectoryGrant, FilePicker, PermissionSurface,
    PickResult, ShareSurface, STORE_CONTENT_TYPE,
};

/// Errors specific to export/import operations
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("'{path}' is not a valid store: {details}")]
    InvalidStore { path: PathBuf, details: String },

    #[error("Share failed: {0}")]
    ShareFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackupError {
    /// Returns a short, human-readable message suitable for display to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(what) => format!("Access was not granted ({what})"),
            Self::InvalidStore { .. } => {
                "That file is not a Banana Book backup. Nothing was changed.".to_string()
            }
            Self::ShareFailed(e) => format!("Could not share the notes file: {e}"),
            Self::Storage(e) => match e.recovery_suggestion() {
                Some(hint) => format!("{e}. {hint}"),
                None => format!("File error: {e}"),
            },
            Self::Io(e) => format!("File error: {e}"),
        }
    }
}

pub type BackupResult<T> = Result<T, BackupError>;

/// What an export did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A copy was written into a granted directory
    Written { path: PathBuf, bytes: u64 },
    /// The store file was handed to the share surface
    Shared { path: PathBuf },
}

/// What an import did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The user backed out of the file picker
    Cancelled,
    Imported {
        source: PathBuf,
        bytes: u64,
        imported_at: DateTime<Utc>,
    },
}

/// Copy the store file out to the user
///
/// Never modifies the store file.
pub fn export_store<S>(store: &Store, mode: ExportMode, surfaces: &mut S) -> BackupResult<ExportOutcome>
where
    S: DirectoryAccess + ShareSurface + ?Sized,
{
    let source = store.path();

    match mode {
        ExportMode::Directory => {
            let dir = match surfaces.request_directory_access() {
                DirectoryGrant::Granted(dir) => dir,
                DirectoryGrant::Denied => {
                    warn!("Export aborted: directory access denied");
                    return Err(BackupError::PermissionDenied(
                        "directory access".to_string(),
                    ));
                }
            };

            let blob = read_blob(&source)?;
            let target = dir.join(store_file_name(&source));
            atomic_write(&target, &blob)?;

            info!("Exported {} bytes to {:?}", blob.len(), target);
            Ok(ExportOutcome::Written {
                path: target,
                bytes: blob.len() as u64,
            })
        }
        ExportMode::Share => {
            surfaces
                .share(&source, STORE_CONTENT_TYPE)
                .map_err(BackupError::ShareFailed)?;

            info!("Shared store file {:?}", source);
            Ok(ExportOutcome::Shared { path: source })
        }
    }
}

/// Let the user pick a store file and replace the whole store with it
pub fn import_store<S>(store: &mut Store, surfaces: &mut S) -> BackupResult<ImportOutcome>
where
    S: PermissionSurface + FilePicker + ?Sized,
{
    if !ensure_permission(surfaces).is_granted() {
        warn!("Import aborted: storage permission denied");
        return Err(BackupError::PermissionDenied("storage".to_string()));
    }

    match surfaces.pick_file() {
        PickResult::Cancelled => {
            info!("Import cancelled");
            Ok(ImportOutcome::Cancelled)
        }
        PickResult::Picked(path) => import_from_path(store, &path),
    }
}

/// Replace the whole store with the file at `source`
pub fn import_from_path(store: &mut Store, source: &Path) -> BackupResult<ImportOutcome> {
    ensure_dir(&store.config().store_dir())?;

    let blob = read_blob(source)?;
    let staged = stage_import(store, source, &blob)?;
    commit_import(store, &staged)?;

    info!("Imported {} bytes from {:?}", blob.len(), source);
    Ok(ImportOutcome::Imported {
        source: source.to_path_buf(),
        bytes: blob.len() as u64,
        imported_at: Utc::now(),
    })
}

/// Write the candidate next to the store and check its structure
fn stage_import(store: &Store, source: &Path, blob: &[u8]) -> BackupResult<PathBuf> {
    if !has_sqlite_header(blob) {
        return Err(BackupError::InvalidStore {
            path: source.to_path_buf(),
            details: "missing SQLite header".to_string(),
        });
    }

    let staged = temp_path_for(&store.path(), "import");
    write_synced(&staged, blob)?;

    let check = Connection::open_with_flags(&staged, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| e.to_string())
        .and_then(|conn| validate_store(&conn));

    if let Err(details) = check {
        let _ = fs::remove_file(&staged);
        warn!("Rejected import from {:?}: {}", source, details);
        return Err(BackupError::InvalidStore {
            path: source.to_path_buf(),
            details,
        });
    }

    Ok(staged)
}

/// Swap the staged file in: close, keep a backup, rename, reopen
fn commit_import(store: &mut Store, staged: &Path) -> BackupResult<()> {
    let live = store.path();
    let backup = store.config().backup_path();

    if let Err(e) = store.close() {
        let _ = fs::remove_file(staged);
        return Err(e.into());
    }

    if live.exists() {
        if let Err(e) = fs::copy(&live, &backup) {
            let _ = fs::remove_file(staged);
            store.reopen()?;
            return Err(StorageError::from_io(e, backup).into());
        }
    }

    let renamed = commit_rename(staged, &live);
    let reopened = store.reopen();

    match (renamed, reopened) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), reopened) => {
            // The previous file is still in place
            reopened?;
            Err(e.into())
        }
        (Ok(()), Err(e)) => {
            warn!("Imported store failed to open, restoring {:?}: {}", backup, e);
            fs::copy(&backup, &live)?;
            store.reopen()?;
            Err(e.into())
        }
    }
}

fn store_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::config::DEFAULT_STORE_NAME.to_string())
}
