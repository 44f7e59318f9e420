//! # Store Facade
//!
//! [`DocStore`] is the single entry point for collaborators. It owns the
//! configuration and wires the components together:
//!
//! ```text
//!                  ┌──────────────┐
//!   register ────► │  Registrar   │──┐
//!   upload   ────► │  Uploader    │──┤    ┌───────────────┐
//!   delete   ────► │  Deleter     │──┼──► │ MetadataStore │ ◄── LatestResolver
//!   list     ────► │  Scanner     │──┘    └───────────────┘
//!   search   ────► │  + Filter    │
//!                  └──────────────┘
//! ```
//!
//! Configuration gates (read-only mode, archive size, disabled deletion) are
//! enforced here so the components stay configuration-free.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::archive::CHANGELOG_FILE;
use crate::config::StoreConfig;
use crate::deletion::{DeleteOutcome, VersionDeleter, VERSION_NOT_FOUND};
use crate::error::{StoreError, StoreResult};
use crate::filter::ProjectFilter;
use crate::latest::{LatestResolver, LATEST_POINTER_NAME};
use crate::metadata::MetadataStore;
use crate::registration::{ProjectRegistrar, RegisterRequest, RegistrationOutcome};
use crate::scanner::{DirectoryScanner, ProjectView};
use crate::uploader::{ArtifactUploader, UploadOutcome};
use crate::validation::{validate_archive_size, validate_project_name, validate_version, ValidationError};

pub const DELETION_DISABLED: &str = "Deletion is disabled.";
pub const INVALID_UNIQUE_KEY: &str = "Invalid unique key!";

#[derive(Debug, Clone)]
pub struct DocStore {
    config: Arc<StoreConfig>,
    metadata: MetadataStore,
    latest: LatestResolver,
    uploader: ArtifactUploader,
    deleter: VersionDeleter,
    registrar: ProjectRegistrar,
    scanner: DirectoryScanner,
}

impl DocStore {
    pub fn new(config: Arc<StoreConfig>) -> Self {
        let metadata = MetadataStore::new(&config.docfiles_dir);
        let latest = LatestResolver::new(metadata.clone());

        Self {
            uploader: ArtifactUploader::new(metadata.clone(), latest.clone()),
            deleter: VersionDeleter::new(metadata.clone(), latest.clone()),
            registrar: ProjectRegistrar::new(metadata.clone()),
            scanner: DirectoryScanner::new(metadata.clone()),
            config,
            metadata,
            latest,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.metadata.root()
    }

    pub fn register(&self, request: &RegisterRequest) -> StoreResult<RegistrationOutcome> {
        self.registrar.register(request)
    }

    /// Validate a raw JSON registration payload, then register it.
    pub fn register_json(&self, payload: &Value) -> StoreResult<RegistrationOutcome> {
        let request = RegisterRequest::from_json(payload)?;
        self.register(&request)
    }

    /// Upload an archive read from `archive` under the name `filename`.
    pub fn upload<R: Read + Seek>(
        &self,
        mut archive: R,
        filename: &str,
        unique_key: &str,
        allow_reupload: bool,
    ) -> StoreResult<UploadOutcome> {
        if self.config.readonly {
            warn!(filename = %filename, "Upload refused: store is read-only");
            return Err(StoreError::ReadOnly);
        }

        let size = archive.seek(SeekFrom::End(0))?;
        archive.rewind()?;
        validate_archive_size(size, self.config.max_content_bytes()).map_err(|e| match e {
            ValidationError::FileTooLarge { actual, max } => {
                StoreError::ArchiveTooLarge { actual, max }
            }
            other => StoreError::Validation(other),
        })?;

        self.uploader
            .upload(archive, filename, unique_key, allow_reupload)
    }

    /// Upload the archive file at `path`, named after its file name.
    pub fn upload_file(
        &self,
        path: &Path,
        unique_key: &str,
        allow_reupload: bool,
    ) -> StoreResult<UploadOutcome> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| StoreError::InvalidArchiveName {
                filename: path.display().to_string(),
            })?;
        let file = File::open(path)?;
        self.upload(file, &filename, unique_key, allow_reupload)
    }

    /// Delete one version after checking the project's unique key.
    pub fn delete_version(
        &self,
        project: &str,
        version: &str,
        unique_key: &str,
    ) -> StoreResult<DeleteOutcome> {
        if self.config.readonly {
            warn!(project = %project, version = %version, "Delete refused: store is read-only");
            return Err(StoreError::ReadOnly);
        }
        validate_project_name(project)?;
        validate_version(version)?;

        if self.config.disable_delete {
            return Ok(DeleteOutcome::failed(DELETION_DISABLED));
        }

        if !self.metadata.project_dir(project).is_dir() {
            return Ok(DeleteOutcome::failed(VERSION_NOT_FOUND));
        }
        let stored = match self.metadata.read(project) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(project = %project, error = %e, "Delete failed: unreadable metadata");
                return Ok(DeleteOutcome::failed(e.to_string()));
            }
        };
        if !stored.is_registered() || stored.unique_key != unique_key {
            warn!(project = %project, "Delete refused: unique key mismatch");
            return Ok(DeleteOutcome::failed(INVALID_UNIQUE_KEY));
        }

        Ok(self.deleter.delete_version(project, version))
    }

    pub fn list_all(&self) -> StoreResult<Vec<ProjectView>> {
        self.scanner.list_all()
    }

    pub fn search(&self, filter: &ProjectFilter) -> StoreResult<Vec<ProjectView>> {
        let matches = filter.apply(self.scanner.list_all()?)?;
        info!(filter = ?filter, matches = matches.len(), "Project search");
        Ok(matches)
    }

    pub fn project_versions(&self, project: &str) -> StoreResult<Option<ProjectView>> {
        validate_project_name(project)?;
        Ok(self.scanner.project_versions(project))
    }

    /// Directory holding the newest version of `project`.
    pub fn latest_dir(&self, project: &str) -> StoreResult<Option<PathBuf>> {
        validate_project_name(project)?;
        self.latest.resolve_dir(project)
    }

    /// Contents of the project's `changelog.html`, if it has one.
    pub fn changelog(&self, project: &str) -> StoreResult<Option<String>> {
        validate_project_name(project)?;
        match fs::read_to_string(self.metadata.project_dir(project).join(CHANGELOG_FILE)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// URL of a listed version's `index.html` below `docfiles_link_root`.
    ///
    /// `latest` is replaced by the version it currently names.
    pub fn doc_url(&self, project: &str, version: &str) -> StoreResult<Option<String>> {
        let Some(view) = self.project_versions(project)? else {
            return Ok(None);
        };
        if !view.has_version(version) {
            return Ok(None);
        }
        let target = match view.versions.first() {
            Some(latest) if version == LATEST_POINTER_NAME => latest.resolves_to.as_deref(),
            _ => Some(version),
        };

        let root = self.config.docfiles_link_root.trim_end_matches('/');
        Ok(target.map(|target| format!("{root}/{}/{target}/index.html", view.directory)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn store(profile: Profile) -> (TempDir, DocStore) {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::with_root(temp.path(), profile);
        (temp, DocStore::new(Arc::new(config)))
    }

    #[test]
    fn test_readonly_refuses_upload() {
        let (_temp, store) = store(Profile::Prod);
        let err = store
            .upload(Cursor::new(Vec::new()), "sample-1.0.0.zip", "key", false)
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadOnly));
    }

    #[test]
    fn test_oversized_archive_refused() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig {
            max_content_mb: 0,
            ..StoreConfig::with_root(temp.path(), Profile::Dev)
        };
        let store = DocStore::new(Arc::new(config));

        let err = store
            .upload(Cursor::new(vec![0u8; 16]), "sample-1.0.0.zip", "key", false)
            .unwrap_err();
        assert!(matches!(err, StoreError::ArchiveTooLarge { actual: 16, max: 0 }));
    }

    #[test]
    fn test_delete_disabled() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig {
            disable_delete: true,
            ..StoreConfig::with_root(temp.path(), Profile::Dev)
        };
        let store = DocStore::new(Arc::new(config));

        let outcome = store.delete_version("sample", "1.0.0", "key").unwrap();
        assert_eq!(outcome, DeleteOutcome::failed(DELETION_DISABLED));
    }

    #[test]
    fn test_lookups_reject_unsafe_names() {
        let (_temp, store) = store(Profile::Dev);
        assert!(matches!(
            store.changelog("../etc").unwrap_err(),
            StoreError::Validation(_)
        ));
        assert!(store.latest_dir("a/b").is_err());
        assert!(store.delete_version("sample", "..", "key").is_err());
    }

    #[test]
    fn test_changelog_absent() {
        let (_temp, store) = store(Profile::Dev);
        assert_eq!(store.changelog("sample").unwrap(), None);
    }
}
