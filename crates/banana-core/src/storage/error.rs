//! Storage errors
//!
//! Every failure touching the store file, its directory or the `.bak` copy.
//! I/O errors are sorted by cause so the CLI can tell the user what to do.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not create the store directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not allowed to use '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No room left to write '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Row operation on a handle closed for an import
    #[error("Notes file '{path}' is closed")]
    Closed { path: PathBuf },

    #[error("SQLite: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("No file at '{path}'")]
    NotFound { path: PathBuf },

    /// Staged file could not replace its target
    #[error("Could not move '{from}' into place at '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Wrap an I/O error from writing `path`, sorted by cause
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            // ErrorKind::StorageFull is not stable yet
            _ if is_disk_full(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Like [`StorageError::from_io`], for errors from reading `path`
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        match StorageError::from_io(error, path) {
            StorageError::WriteError { path, source } => StorageError::ReadError { path, source },
            other => other,
        }
    }

    /// What the user can do about it, when there is something
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free some space, then run the command again."),
            StorageError::PermissionDenied { .. } => {
                Some("Make sure your user owns the Banana Book data directory and the files you pick.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Point data_dir somewhere writable: banana config set data_dir <DIR>")
            }
            StorageError::NotFound { .. } => Some("Check the path and try again."),
            _ => None,
        }
    }
}

fn is_disk_full(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/data/SQLite/note.db"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().is_some());
        assert!(err.to_string().contains("/data/SQLite/note.db"));
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_io(io_err, PathBuf::from("/downloads/note.db"));

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/note.db"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_from_read_classification() {
        let io_err = io::Error::new(io::ErrorKind::InvalidData, "bad bytes");
        let err = StorageError::from_read(io_err, PathBuf::from("/some/file"));
        assert!(matches!(err, StorageError::ReadError { .. }));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = StorageError::from_read(io_err, PathBuf::from("/some/file"));
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_closed_has_no_suggestion() {
        let err = StorageError::Closed {
            path: PathBuf::from("/data/SQLite/note.db"),
        };
        assert!(err.to_string().contains("closed"));
        assert!(err.recovery_suggestion().is_none());
    }
}
