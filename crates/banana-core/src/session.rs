//! Session
//!
//! Owns the store and one view cache per table. Every mutation goes to the
//! store first; the matching cache only moves once the store reported
//! success.

use tracing::{info, warn};

use crate::backup::{self, BackupError, ExportOutcome, ImportOutcome};
use crate::cache::{Change, ViewCache};
use crate::config::{Config, ExportMode};
use crate::models::{Image, Note, NoteText, Record, ValidationError};
use crate::storage::{StorageError, StorageResult};
use crate::store::Store;
use crate::surfaces::{
    ensure_permission, CaptureResult, DirectoryAccess, FilePicker, MediaCapture,
    PermissionSurface, ShareSurface,
};

/// Errors surfaced to callers of the session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Permission denied: camera or gallery")]
    CapturePermissionDenied,

    #[error("Session worker has stopped")]
    WorkerStopped,
}

impl SessionError {
    /// Returns a short, human-readable message suitable for display to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backup(e) => e.user_message(),
            Self::Storage(e) => match e.recovery_suggestion() {
                Some(hint) => format!("{e}. {hint}"),
                None => e.to_string(),
            },
            other => other.to_string(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// The store plus its view caches
pub struct Session {
    store: Store,
    notes: ViewCache<Note>,
    images: ViewCache<Image>,
}

impl Session {
    /// Open the store for `config` and seed both caches
    pub fn open(config: Config) -> StorageResult<Self> {
        Ok(Self::from_store(Store::open_with_config(config)?))
    }

    /// Wrap an already open store and seed both caches from it
    pub fn from_store(store: Store) -> Self {
        let notes = seed(&store);
        let images = seed(&store);
        Self {
            store,
            notes,
            images,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn notes(&self) -> &ViewCache<Note> {
        &self.notes
    }

    pub fn images(&self) -> &ViewCache<Image> {
        &self.images
    }

    // ==================== Notes ====================

    pub fn add_note(&mut self, text: &NoteText) -> SessionResult<Note> {
        let note: Note = self.store.insert(text.as_str())?;
        self.notes.apply(Change::Inserted(note.clone()));
        Ok(note)
    }

    /// Returns false if no note has `id`
    pub fn edit_note(&mut self, id: i64, text: &NoteText) -> SessionResult<bool> {
        let updated = self.store.update::<Note>(id, text.as_str())?;
        if updated {
            self.notes.apply(Change::Updated {
                id,
                payload: text.as_str().to_string(),
            });
        }
        Ok(updated)
    }

    /// Returns false if no note has `id`
    pub fn delete_note(&mut self, id: i64) -> SessionResult<bool> {
        let deleted = self.store.delete::<Note>(id)?;
        if deleted {
            self.notes.apply(Change::Deleted(id));
        }
        Ok(deleted)
    }

    // ==================== Images ====================

    pub fn add_image(&mut self, uri: &str) -> SessionResult<Image> {
        let image: Image = self.store.insert(uri)?;
        self.images.apply(Change::Inserted(image.clone()));
        Ok(image)
    }

    pub fn update_image(&mut self, id: i64, uri: &str) -> SessionResult<bool> {
        let updated = self.store.update::<Image>(id, uri)?;
        if updated {
            self.images.apply(Change::Updated {
                id,
                payload: uri.to_string(),
            });
        }
        Ok(updated)
    }

    pub fn delete_image(&mut self, id: i64) -> SessionResult<bool> {
        let deleted = self.store.delete::<Image>(id)?;
        if deleted {
            self.images.apply(Change::Deleted(id));
        }
        Ok(deleted)
    }

    /// Ask the camera or gallery for a photo and record it
    ///
    /// Returns `None` if the user backed out.
    pub fn capture_image<S>(&mut self, surfaces: &mut S) -> SessionResult<Option<Image>>
    where
        S: PermissionSurface + MediaCapture + ?Sized,
    {
        if !ensure_permission(surfaces).is_granted() {
            warn!("Capture aborted: permission denied");
            return Err(SessionError::CapturePermissionDenied);
        }

        match surfaces.capture_or_pick() {
            CaptureResult::Cancelled => Ok(None),
            CaptureResult::Captured(uri) => self.add_image(&uri).map(Some),
        }
    }

    // ==================== Backup ====================

    pub fn export<S>(&self, mode: ExportMode, surfaces: &mut S) -> SessionResult<ExportOutcome>
    where
        S: DirectoryAccess + ShareSurface + ?Sized,
    {
        Ok(backup::export_store(&self.store, mode, surfaces)?)
    }

    /// Replace the whole store with a user-picked file
    ///
    /// Both caches are reseeded after a successful import.
    pub fn import<S>(&mut self, surfaces: &mut S) -> SessionResult<ImportOutcome>
    where
        S: PermissionSurface + FilePicker + ?Sized,
    {
        let outcome = backup::import_store(&mut self.store, surfaces)?;
        if let ImportOutcome::Imported { .. } = outcome {
            self.reseed();
            info!(
                "Caches reseeded: {} notes, {} images",
                self.notes.len(),
                self.images.len()
            );
        }
        Ok(outcome)
    }

    /// Import from a known path, skipping the permission and picker steps
    pub fn import_from_path(&mut self, path: &std::path::Path) -> SessionResult<ImportOutcome> {
        let outcome = backup::import_from_path(&mut self.store, path)?;
        self.reseed();
        Ok(outcome)
    }

    fn reseed(&mut self) {
        self.notes = seed(&self.store);
        self.images = seed(&self.store);
    }

    /// Close the underlying store
    pub fn close(&mut self) -> SessionResult<()> {
        Ok(self.store.close()?)
    }
}

/// Full load of `R`'s table; a failed load yields an empty cache carrying the error
fn seed<R: Record>(store: &Store) -> ViewCache<R> {
    match store.load_all::<R>() {
        Ok(records) => ViewCache::seeded(records),
        Err(e) => {
            warn!("Failed to load {}: {}", R::TABLE, e);
            ViewCache::failed(e.to_string())
        }
    }
}
