//! Terminal implementations of the collaborator surfaces
//!
//! Values given on the command line answer first; anything missing is asked
//! for on the terminal. Without a TTY every question is answered "no".

use std::path::{Path, PathBuf};

use tracing::warn;

use banana_core::{
    CaptureResult, DirectoryAccess, DirectoryGrant, FilePicker, MediaCapture, Permission,
    PermissionSurface, PickResult, ShareSurface,
};

use crate::editor::{confirm, prompt_line};

#[derive(Debug, Default)]
pub struct CliSurfaces {
    /// `--yes`: treat every permission as granted
    assume_yes: bool,
    granted: bool,
    import_path: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    capture_path: Option<PathBuf>,
}

impl CliSurfaces {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            ..Self::default()
        }
    }

    /// File the picker returns instead of prompting
    pub fn with_import_path(mut self, path: Option<PathBuf>) -> Self {
        self.import_path = path;
        self
    }

    /// Directory granted for export instead of prompting
    pub fn with_export_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.export_dir = dir;
        self
    }

    /// Photo returned by capture instead of prompting
    pub fn with_capture_path(mut self, path: Option<PathBuf>) -> Self {
        self.capture_path = path;
        self
    }
}

impl PermissionSurface for CliSurfaces {
    fn check_permission(&mut self) -> Permission {
        if self.assume_yes || self.granted {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn request_permission(&mut self) -> Permission {
        self.granted = confirm("Allow Banana Book to read files you choose?").unwrap_or(false);
        self.check_permission()
    }
}

impl FilePicker for CliSurfaces {
    fn pick_file(&mut self) -> PickResult {
        let path = match self.import_path.take() {
            Some(path) => Some(path),
            None => ask_path("Backup file to import (empty to cancel)"),
        };
        match path {
            Some(path) => PickResult::Picked(path),
            None => PickResult::Cancelled,
        }
    }
}

impl DirectoryAccess for CliSurfaces {
    fn request_directory_access(&mut self) -> DirectoryGrant {
        let dir = match self.export_dir.clone() {
            Some(dir) => Some(dir),
            None => ask_path("Directory to export into (empty to cancel)"),
        };
        match dir {
            Some(dir) if dir.is_dir() => DirectoryGrant::Granted(dir),
            Some(dir) => {
                warn!("Export directory {:?} does not exist", dir);
                DirectoryGrant::Denied
            }
            None => DirectoryGrant::Denied,
        }
    }
}

impl ShareSurface for CliSurfaces {
    /// Reveal the file in the system file manager
    fn share(&mut self, path: &Path, _content_type: &str) -> Result<(), String> {
        let target = path.parent().unwrap_or(path);
        open::that(target).map_err(|e| format!("could not open {}: {}", target.display(), e))
    }
}

impl MediaCapture for CliSurfaces {
    fn capture_or_pick(&mut self) -> CaptureResult {
        let path = match self.capture_path.take() {
            Some(path) => Some(path),
            None => ask_path("Photo to add (empty to cancel)"),
        };
        match path.as_deref().and_then(file_uri) {
            Some(uri) => CaptureResult::Captured(uri),
            None => CaptureResult::Cancelled,
        }
    }
}

fn ask_path(prompt: &str) -> Option<PathBuf> {
    prompt_line(prompt).ok().flatten().map(PathBuf::from)
}

/// `file://` URI for an existing file
fn file_uri(path: &Path) -> Option<String> {
    match path.canonicalize() {
        Ok(abs) if abs.is_file() => Some(format!("file://{}", abs.display())),
        Ok(abs) => {
            eprintln!("Not a file: {}", abs.display());
            None
        }
        Err(e) => {
            eprintln!("Cannot use {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_assume_yes_grants_permission() {
        let mut surfaces = CliSurfaces::new(true);
        assert_eq!(surfaces.check_permission(), Permission::Granted);

        let mut surfaces = CliSurfaces::new(false);
        assert_eq!(surfaces.check_permission(), Permission::Denied);
    }

    #[test]
    fn test_picker_returns_given_path_once() {
        let mut surfaces =
            CliSurfaces::new(true).with_import_path(Some(PathBuf::from("/tmp/note.db")));
        assert_eq!(
            surfaces.pick_file(),
            PickResult::Picked(PathBuf::from("/tmp/note.db"))
        );
        assert!(surfaces.import_path.is_none());
    }

    #[test]
    fn test_directory_grant_requires_existing_dir() {
        let temp_dir = TempDir::new().unwrap();

        let mut surfaces =
            CliSurfaces::new(false).with_export_dir(Some(temp_dir.path().to_path_buf()));
        assert_eq!(
            surfaces.request_directory_access(),
            DirectoryGrant::Granted(temp_dir.path().to_path_buf())
        );

        let mut surfaces =
            CliSurfaces::new(false).with_export_dir(Some(temp_dir.path().join("missing")));
        assert_eq!(surfaces.request_directory_access(), DirectoryGrant::Denied);
    }

    #[test]
    fn test_capture_builds_file_uri() {
        let temp_dir = TempDir::new().unwrap();
        let photo = temp_dir.path().join("beach.jpg");
        fs::write(&photo, b"jpeg").unwrap();

        let mut surfaces = CliSurfaces::new(true).with_capture_path(Some(photo.clone()));
        let expected = format!("file://{}", photo.canonicalize().unwrap().display());
        assert_eq!(surfaces.capture_or_pick(), CaptureResult::Captured(expected));
    }

    #[test]
    fn test_file_uri_rejects_missing_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        assert!(file_uri(&temp_dir.path().join("nope.jpg")).is_none());
        assert!(file_uri(temp_dir.path()).is_none());
    }
}
