//! Collaborator surfaces
//!
//! The core never draws prompts, pickers or camera views. It talks to
//! whatever UI hosts it through these traits; the CLI provides terminal
//! implementations and tests provide scripted ones.

use std::path::{Path, PathBuf};

/// MIME type advertised for exported store files
pub const STORE_CONTENT_TYPE: &str = "application/octet-stream";

/// Answer of a permission check or request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        self == Permission::Granted
    }
}

/// Result of asking the user for a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    Cancelled,
    Picked(PathBuf),
}

/// Result of asking the user for a writable directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryGrant {
    Granted(PathBuf),
    Denied,
}

/// Result of asking the user for a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResult {
    Cancelled,
    /// Reference to the captured or selected asset
    Captured(String),
}

/// Storage and media permission prompts
pub trait PermissionSurface {
    fn check_permission(&mut self) -> Permission;

    fn request_permission(&mut self) -> Permission;
}

/// Lets the user choose an existing file
pub trait FilePicker {
    fn pick_file(&mut self) -> PickResult;
}

/// Grants write access to a user-chosen directory
pub trait DirectoryAccess {
    fn request_directory_access(&mut self) -> DirectoryGrant;
}

/// Hands a file to the platform's share/export UI
pub trait ShareSurface {
    /// Offer `path` (of type `content_type`) to the user
    fn share(&mut self, path: &Path, content_type: &str) -> Result<(), String>;
}

/// Camera or gallery
pub trait MediaCapture {
    fn capture_or_pick(&mut self) -> CaptureResult;
}

/// Everything a session worker needs from its host
pub trait Surfaces:
    PermissionSurface + FilePicker + DirectoryAccess + ShareSurface + MediaCapture
{
}

impl<T> Surfaces for T where
    T: PermissionSurface + FilePicker + DirectoryAccess + ShareSurface + MediaCapture
{
}

/// Check the permission and, when missing, ask for it once
///
/// The answer to the request is what counts, not the stale first check.
pub fn ensure_permission<P: PermissionSurface + ?Sized>(surface: &mut P) -> Permission {
    match surface.check_permission() {
        Permission::Granted => Permission::Granted,
        Permission::Denied => surface.request_permission(),
    }
}
