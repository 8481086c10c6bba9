//! Run-wide ownership of scratch directories and the working directory.

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{InstallError, InstallResult};

/// Prefix for scratch directory names.
const SCRATCH_PREFIX: &str = "ghext-";

/// Owns every scratch directory of a run.
///
/// Dropping the scope removes each registered directory once and restores
/// the working directory captured at creation, whichever way the run ends.
#[derive(Debug)]
pub struct RunScope {
    dirs: Vec<TempDir>,
    original_cwd: Option<PathBuf>,
}

impl Default for RunScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RunScope {
    /// Open a scope, remembering the current working directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dirs: Vec::new(),
            original_cwd: env::current_dir().ok(),
        }
    }

    /// Create a scratch directory owned by this scope.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Scratch`] if the directory cannot be created.
    pub fn scratch_dir(&mut self) -> InstallResult<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(InstallError::Scratch)?;
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "created scratch directory");
        self.dirs.push(dir);
        Ok(path)
    }

    /// Paths of the directories currently owned.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.dirs.iter().map(|d| d.path().to_path_buf()).collect()
    }

    /// Remove every owned directory and restore the working directory.
    /// Later calls find nothing left to do.
    pub fn release(&mut self) {
        if !self.dirs.is_empty() {
            info!("cleaning up");
        }
        for dir in self.dirs.drain(..) {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(path = %path.display(), error = %e, "failed to remove scratch directory");
            }
        }

        if let Some(original) = self.original_cwd.take()
            && env::current_dir().ok().as_ref() != Some(&original)
            && let Err(e) = env::set_current_dir(&original)
        {
            warn!(path = %original.display(), error = %e, "failed to restore working directory");
        }
    }
}

impl Drop for RunScope {
    fn drop(&mut self) {
        self.release();
    }
}
