//! Latest-version pointer.
//!
//! `<root>/<project>/latest` is a plain text file holding the name of the
//! newest version. It is derived from the metadata record and rewritten after
//! every upload and deletion; nothing treats it as authoritative.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::lock::ProjectLock;
use crate::metadata::MetadataStore;
use crate::validation::is_valid_version;

/// File name of the per-project latest pointer.
pub const LATEST_POINTER_NAME: &str = "latest";

#[derive(Debug, Clone)]
pub struct LatestResolver {
    metadata: MetadataStore,
}

impl LatestResolver {
    pub fn new(metadata: MetadataStore) -> Self {
        Self { metadata }
    }

    fn pointer_path(&self, project: &str) -> PathBuf {
        self.metadata.project_dir(project).join(LATEST_POINTER_NAME)
    }

    /// Recompute and rewrite the pointer for `project`.
    pub fn refresh(&self, project: &str) -> StoreResult<Option<String>> {
        let lock = self.metadata.lock(project)?;
        self.refresh_locked(&lock, project)
    }

    /// Same as [`LatestResolver::refresh`] for callers already holding the lock.
    pub fn refresh_locked(
        &self,
        _held: &ProjectLock,
        project: &str,
    ) -> StoreResult<Option<String>> {
        let latest = self.metadata.latest_version(project)?;
        let pointer = self.pointer_path(project);

        match &latest {
            Some(version) => {
                let mut temp_file = tempfile::Builder::new()
                    .prefix(".latest-")
                    .suffix(".tmp")
                    .tempfile_in(self.metadata.project_dir(project))?;
                temp_file.write_all(version.as_bytes())?;
                temp_file
                    .persist(&pointer)
                    .map_err(|e| StoreError::Io(e.error))?;
                info!(project = %project, latest = %version, "Latest pointer updated");
            }
            None => match fs::remove_file(&pointer) {
                Ok(()) => info!(project = %project, "Latest pointer cleared"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }

        Ok(latest)
    }

    /// Version the pointer currently names, if any.
    pub fn resolve(&self, project: &str) -> StoreResult<Option<String>> {
        let pointer = self.pointer_path(project);
        let content = match fs::read_to_string(&pointer) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let version = content.trim();
        if !is_valid_version(version) {
            warn!(pointer = %pointer.display(), "Ignoring malformed latest pointer");
            return Ok(None);
        }
        Ok(Some(version.to_string()))
    }

    /// Directory of the version the pointer names, if it exists.
    pub fn resolve_dir(&self, project: &str) -> StoreResult<Option<PathBuf>> {
        Ok(self.resolve(project)?.and_then(|version| {
            let dir = self.metadata.project_dir(project).join(&version);
            if dir.is_dir() {
                Some(dir)
            } else {
                debug!(project = %project, version = %version, "Latest pointer targets a missing directory");
                None
            }
        }))
    }
}
