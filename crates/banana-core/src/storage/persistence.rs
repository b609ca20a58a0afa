//! Whole-file persistence helpers
//!
//! The backup flows treat the store as an opaque blob. These helpers read
//! and write such blobs, using atomic writes (write to temp file, then
//! rename) so a destination is never left partially written.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{StorageError, StorageResult};

/// Size and presence information about the store files
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
    pub store_exists: bool,
    pub store_size: u64,
    pub store_modified: Option<DateTime<Utc>>,
    pub backup_exists: bool,
    pub backup_size: u64,
}

impl StorageStats {
    /// Collect stats for a store file and its import backup
    pub fn collect(store_path: &Path, backup_path: &Path) -> Self {
        let store_meta = fs::metadata(store_path).ok();
        let backup_meta = fs::metadata(backup_path).ok();

        Self {
            store_exists: store_meta.is_some(),
            store_size: store_meta.as_ref().map(|m| m.len()).unwrap_or(0),
            store_modified: store_meta
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            backup_exists: backup_meta.is_some(),
            backup_size: backup_meta.as_ref().map(|m| m.len()).unwrap_or(0),
        }
    }

    pub fn total_size(&self) -> u64 {
        self.store_size + self.backup_size
    }

    /// Human readable total size
    pub fn total_size_human(&self) -> String {
        human_size(self.total_size())
    }
}

/// Format a byte count for display
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Create a directory (and parents) if missing
pub fn ensure_dir(dir: &Path) -> StorageResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Read a whole file into memory
pub fn read_blob(path: &Path) -> StorageResult<Vec<u8>> {
    fs::read(path).map_err(|e| StorageError::from_read(e, path.to_path_buf()))
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state.
pub fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = temp_path_for(path, "tmp");
    write_synced(&temp_path, data)?;
    commit_rename(&temp_path, path)
}

/// Write a file and sync it to disk, without any rename
pub fn write_synced(path: &Path, data: &[u8]) -> StorageResult<()> {
    let mut file = File::create(path).map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;

    Ok(())
}

/// Rename `from` over `to`, removing `from` if the rename fails
pub fn commit_rename(from: &Path, to: &Path) -> StorageResult<()> {
    fs::rename(from, to).map_err(|source| {
        let _ = fs::remove_file(from);
        StorageError::AtomicWriteFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    })
}

/// Sibling path used for staging writes to `path`
pub fn temp_path_for(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    path.with_file_name(format!(".{}.{}.{}", name, uuid::Uuid::new_v4().simple(), suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.db");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("note.db");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(read_blob(&path).unwrap(), b"second");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_blob_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_blob(&temp_dir.path().join("missing.db")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let path = PathBuf::from("/data/SQLite/note.db");
        let temp = temp_path_for(&path, "import");
        assert_eq!(temp.parent(), path.parent());
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".note.db."));
        assert!(name.ends_with(".import"));
    }

    #[test]
    fn test_storage_stats() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_dir.path().join("note.db");
        let backup = temp_dir.path().join("note.db.bak");

        let stats = StorageStats::collect(&store, &backup);
        assert!(!stats.store_exists);
        assert_eq!(stats.total_size(), 0);

        fs::write(&store, vec![0u8; 2048]).unwrap();
        let stats = StorageStats::collect(&store, &backup);
        assert!(stats.store_exists);
        assert!(stats.store_modified.is_some());
        assert_eq!(stats.store_size, 2048);
        assert_eq!(stats.total_size_human(), "2.0 KB");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }
}
