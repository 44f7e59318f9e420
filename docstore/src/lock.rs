//! Per-project mutual exclusion.
//!
//! Metadata read-modify-write cycles and version promotion for one project run
//! while holding an exclusive advisory lock on `<root>/<project>/.lock`. The
//! lock is per open file handle, so it serializes threads of one process as
//! well as separate processes sharing the storage root.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Lock file name inside each project directory.
pub const LOCK_FILE_NAME: &str = ".lock";

/// Held exclusive lock; released on drop.
#[derive(Debug)]
pub struct ProjectLock {
    file: File,
    path: PathBuf,
}

impl ProjectLock {
    /// Block until the exclusive lock for `project_dir` is acquired.
    pub fn acquire(project_dir: &Path) -> StoreResult<Self> {
        let path = project_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| StoreError::Lock {
                path: path.clone(),
                source,
            })?;

        file.lock_exclusive().map_err(|source| StoreError::Lock {
            path: path.clone(),
            source,
        })?;
        debug!(lock = %path.display(), "Acquired project lock");

        Ok(Self { file, path })
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(lock = %self.path.display(), error = %e, "Failed to release project lock");
        }
    }
}
