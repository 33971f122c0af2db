//! Removal of incomplete files.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Deletes the file it is armed with when dropped, unless disarmed first.
///
/// Covers every exit of a transfer, including a dropped future.
#[derive(Debug, Default)]
pub struct IncompleteGuard {
    path: Option<PathBuf>,
}

impl IncompleteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `path` on drop.
    pub fn arm(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
    }

    /// Keep whatever was written.
    pub fn disarm(&mut self) {
        self.path = None;
    }

    pub fn is_armed(&self) -> bool {
        self.path.is_some()
    }

    /// Remove the armed file right away and disarm.
    pub fn discard(&mut self) {
        if let Some(path) = self.path.take() {
            remove_incomplete(&path);
        }
    }
}

impl Drop for IncompleteGuard {
    fn drop(&mut self) {
        self.discard();
    }
}

fn remove_incomplete(path: &Path) {
    debug!("Removing incomplete file {:?}", path);
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!("Unable to remove {:?}: {}", path, e);
        }
    }
}
