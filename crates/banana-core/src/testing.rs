//! Scripted collaborator surfaces for unit tests

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::surfaces::{
    CaptureResult, DirectoryAccess, DirectoryGrant, FilePicker, MediaCapture, Permission,
    PermissionSurface, PickResult, ShareSurface,
};

/// Surfaces that answer from queues and record what they were asked
#[derive(Debug)]
pub struct ScriptedSurfaces {
    pub permission: Permission,
    pub request_answer: Permission,
    pub permission_requests: usize,
    pub picks: VecDeque<PickResult>,
    pub directory: DirectoryGrant,
    pub share_result: Result<(), String>,
    pub shared: Vec<(PathBuf, String)>,
    pub captures: VecDeque<CaptureResult>,
}

impl Default for ScriptedSurfaces {
    fn default() -> Self {
        Self {
            permission: Permission::Granted,
            request_answer: Permission::Granted,
            permission_requests: 0,
            picks: VecDeque::new(),
            directory: DirectoryGrant::Denied,
            share_result: Ok(()),
            shared: Vec::new(),
            captures: VecDeque::new(),
        }
    }
}

impl ScriptedSurfaces {
    pub fn picking(path: impl Into<PathBuf>) -> Self {
        let mut surfaces = Self::default();
        surfaces.picks.push_back(PickResult::Picked(path.into()));
        surfaces
    }

    pub fn granting_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            directory: DirectoryGrant::Granted(dir.into()),
            ..Self::default()
        }
    }

    pub fn capturing(uri: &str) -> Self {
        let mut surfaces = Self::default();
        surfaces
            .captures
            .push_back(CaptureResult::Captured(uri.to_string()));
        surfaces
    }

    pub fn denying() -> Self {
        Self {
            permission: Permission::Denied,
            request_answer: Permission::Denied,
            ..Self::default()
        }
    }
}

impl PermissionSurface for ScriptedSurfaces {
    fn check_permission(&mut self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        self.permission_requests += 1;
        self.permission = self.request_answer;
        self.request_answer
    }
}

impl FilePicker for ScriptedSurfaces {
    fn pick_file(&mut self) -> PickResult {
        self.picks.pop_front().unwrap_or(PickResult::Cancelled)
    }
}

impl DirectoryAccess for ScriptedSurfaces {
    fn request_directory_access(&mut self) -> DirectoryGrant {
        self.directory.clone()
    }
}

impl ShareSurface for ScriptedSurfaces {
    fn share(&mut self, path: &Path, content_type: &str) -> Result<(), String> {
        self.shared
            .push((path.to_path_buf(), content_type.to_string()));
        self.share_result.clone()
    }
}

impl MediaCapture for ScriptedSurfaces {
    fn capture_or_pick(&mut self) -> CaptureResult {
        self.captures.pop_front().unwrap_or(CaptureResult::Cancelled)
    }
}
