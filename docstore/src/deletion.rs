//! # Version Deletion
//!
//! Removes `<root>/<project>/<version>/`, drops the version from the
//! project's metadata and recomputes the latest pointer, all under the
//! project lock. Failures are reported as a [`DeleteOutcome`] rather than an
//! error so callers can relay the message unchanged.

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::latest::LatestResolver;
use crate::metadata::MetadataStore;

pub const VERSION_NOT_FOUND: &str = "Version not found!";
pub const VERSION_DELETED: &str = "Version deleted successfully!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub ok: bool,
    pub message: String,
}

impl DeleteOutcome {
    pub fn deleted() -> Self {
        Self {
            ok: true,
            message: VERSION_DELETED.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VersionDeleter {
    metadata: MetadataStore,
    latest: LatestResolver,
}

impl VersionDeleter {
    pub fn new(metadata: MetadataStore, latest: LatestResolver) -> Self {
        Self { metadata, latest }
    }

    /// Delete one version. Names must already be validated.
    pub fn delete_version(&self, project: &str, version: &str) -> DeleteOutcome {
        let project_dir = self.metadata.project_dir(project);
        if !project_dir.is_dir() {
            return DeleteOutcome::failed(VERSION_NOT_FOUND);
        }

        let lock = match self.metadata.lock(project) {
            Ok(lock) => lock,
            Err(e) => return DeleteOutcome::failed(e.to_string()),
        };

        let version_dir = project_dir.join(version);
        if !version_dir.is_dir() {
            return DeleteOutcome::failed(VERSION_NOT_FOUND);
        }

        if let Err(e) = fs::remove_dir_all(&version_dir) {
            warn!(project = %project, version = %version, error = %e, "Failed to remove version directory");
            return DeleteOutcome::failed(e.to_string());
        }

        if let Err(e) = self.metadata.update(&lock, project, |metadata| {
            metadata.remove_version(version);
        }) {
            warn!(project = %project, version = %version, error = %e, "Failed to update metadata after deletion");
            return DeleteOutcome::failed(e.to_string());
        }

        if let Err(e) = self.latest.refresh_locked(&lock, project) {
            warn!(project = %project, error = %e, "Failed to refresh latest pointer after deletion");
            return DeleteOutcome::failed(e.to_string());
        }

        info!(project = %project, version = %version, "Version deleted");
        DeleteOutcome::deleted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ProjectFields;
    use tempfile::TempDir;

    fn setup() -> (TempDir, MetadataStore, VersionDeleter) {
        let temp = TempDir::new().unwrap();
        let metadata = MetadataStore::new(temp.path());
        fs::create_dir(metadata.project_dir("sample")).unwrap();
        metadata
            .initialize(
                "sample",
                &ProjectFields {
                    name: "sample".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        let deleter = VersionDeleter::new(metadata.clone(), LatestResolver::new(metadata.clone()));
        (temp, metadata, deleter)
    }

    fn add_version(metadata: &MetadataStore, version: &str) {
        let dir = metadata.project_dir("sample").join(version);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("index.html"), version).unwrap();
        metadata.add_version("sample", version).unwrap();
    }

    #[test]
    fn test_delete_missing_version_changes_nothing() {
        let (_temp, metadata, deleter) = setup();
        add_version(&metadata, "1.0.0");
        let before = fs::read_to_string(metadata.metadata_path("sample")).unwrap();

        let outcome = deleter.delete_version("sample", "2.0.0");

        assert_eq!(outcome, DeleteOutcome::failed(VERSION_NOT_FOUND));
        assert_eq!(
            fs::read_to_string(metadata.metadata_path("sample")).unwrap(),
            before
        );
    }

    #[test]
    fn test_delete_unknown_project() {
        let (_temp, _metadata, deleter) = setup();
        assert!(!deleter.delete_version("other", "1.0.0").ok);
    }

    #[test]
    fn test_delete_latest_moves_pointer_back() {
        let (_temp, metadata, deleter) = setup();
        add_version(&metadata, "1.2.0");
        add_version(&metadata, "1.10.0");
        let latest = LatestResolver::new(metadata.clone());
        latest.refresh("sample").unwrap();

        let outcome = deleter.delete_version("sample", "1.10.0");

        assert_eq!(outcome, DeleteOutcome::deleted());
        assert!(!metadata.project_dir("sample").join("1.10.0").exists());
        assert_eq!(latest.resolve("sample").unwrap().as_deref(), Some("1.2.0"));
        assert!(!metadata.read("sample").unwrap().versions.contains_key("1.10.0"));
    }

    #[test]
    fn test_delete_last_version_clears_pointer() {
        let (_temp, metadata, deleter) = setup();
        add_version(&metadata, "1.0.0");

        assert!(deleter.delete_version("sample", "1.0.0").ok);
        assert_eq!(LatestResolver::new(metadata).resolve("sample").unwrap(), None);
    }
}
