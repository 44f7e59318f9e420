//! # Project Metadata
//!
//! Each project keeps one JSON record at `<root>/<project>/metadata.json`:
//!
//! ```json
//! {
//!   "name": "Sample-Proj",
//!   "description": "This is a sample project",
//!   "owner": "Jane Doe",
//!   "owner-email": "jane@example.com",
//!   "programming-lang": "python",
//!   "tags": ["project", "python", "sample"],
//!   "unique-key": "1f0e7c1e-...",
//!   "versions": {
//!     "1.10.0": { "upload-date": "2024-03-02 10:11:12" },
//!     "1.2.0": { "upload-date": "2024-02-01 09:00:00" }
//!   }
//! }
//! ```
//!
//! `versions` is kept newest first in natural order. Writes replace the whole
//! file through a temporary file in the project directory, and every
//! read-modify-write cycle runs under the project's [`ProjectLock`].

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::lock::ProjectLock;
use crate::natural::natural_cmp;

/// File name of the per-project metadata record.
pub const METADATA_FILE_NAME: &str = "metadata.json";

const UPLOAD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Upload record for a single version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    #[serde(rename = "upload-date")]
    pub upload_date: String,
}

impl VersionRecord {
    pub fn now() -> Self {
        Self {
            upload_date: Local::now().format(UPLOAD_DATE_FORMAT).to_string(),
        }
    }

    /// Date portion of the upload timestamp.
    pub fn upload_day(&self) -> &str {
        self.upload_date
            .split_whitespace()
            .next()
            .unwrap_or(&self.upload_date)
    }
}

/// Descriptive fields supplied at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFields {
    pub name: String,
    pub description: String,
    pub owner: String,
    pub owner_email: String,
    pub programming_lang: String,
    pub tags: Vec<String>,
}

/// Persisted metadata record of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(rename = "owner-email", default)]
    pub owner_email: String,
    #[serde(rename = "programming-lang", default)]
    pub programming_lang: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(rename = "unique-key", default)]
    pub unique_key: String,
    #[serde(default)]
    pub versions: IndexMap<String, VersionRecord>,
    /// Keys this version of the store does not know about, kept on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectMetadata {
    /// Build a fresh record from registration fields and a new unique key.
    pub fn from_fields(fields: &ProjectFields, unique_key: String) -> Self {
        ProjectMetadata {
            name: fields.name.clone(),
            description: fields.description.clone(),
            owner: fields.owner.clone(),
            owner_email: fields.owner_email.clone(),
            programming_lang: fields.programming_lang.to_lowercase(),
            tags: fields.tags.iter().map(|t| t.to_lowercase()).collect(),
            unique_key,
            versions: IndexMap::new(),
            extra: Map::new(),
        }
    }

    /// An empty record means the project has never been registered.
    pub fn is_registered(&self) -> bool {
        !self.unique_key.is_empty()
    }

    pub fn insert_version(&mut self, version: &str, record: VersionRecord) {
        self.versions.insert(version.to_string(), record);
        self.sort_versions();
    }

    /// Returns `true` if the version was present.
    pub fn remove_version(&mut self, version: &str) -> bool {
        let removed = self.versions.shift_remove(version).is_some();
        self.sort_versions();
        removed
    }

    pub fn sort_versions(&mut self) {
        self.versions.sort_by(|a, _, b, _| natural_cmp(b, a));
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.versions.keys().next().map(String::as_str)
    }
}

/// Reads and mutates project metadata files under a storage root.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.root.join(project)
    }

    pub fn metadata_path(&self, project: &str) -> PathBuf {
        self.project_dir(project).join(METADATA_FILE_NAME)
    }

    /// Acquire the exclusive lock guarding `project`.
    pub fn lock(&self, project: &str) -> StoreResult<ProjectLock> {
        ProjectLock::acquire(&self.project_dir(project))
    }

    /// Load a project's metadata, or an empty record if none exists.
    pub fn read(&self, project: &str) -> StoreResult<ProjectMetadata> {
        let path = self.metadata_path(project);
        debug!(path = %path.display(), "Reading project metadata");

        match fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProjectMetadata::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the metadata record for a new project and return its unique key.
    ///
    /// The project directory must already exist. Fails with
    /// [`StoreError::AlreadyExists`] when a record is present.
    pub fn initialize(&self, project: &str, fields: &ProjectFields) -> StoreResult<String> {
        let _lock = self.lock(project)?;
        let path = self.metadata_path(project);

        if path.exists() {
            return Err(StoreError::AlreadyExists {
                project: project.to_string(),
            });
        }

        let unique_key = uuid::Uuid::new_v4().to_string();
        let metadata = ProjectMetadata::from_fields(fields, unique_key.clone());
        self.save(project, &metadata)?;

        info!(project = %project, "Initialized project metadata");
        Ok(unique_key)
    }

    /// Record an upload of `version` with the current time.
    pub fn add_version(&self, project: &str, version: &str) -> StoreResult<ProjectMetadata> {
        let lock = self.lock(project)?;
        self.update(&lock, project, |metadata| {
            metadata.insert_version(version, VersionRecord::now())
        })
    }

    /// Remove `version` from the record; an absent version is not an error.
    pub fn delete_version(&self, project: &str, version: &str) -> StoreResult<ProjectMetadata> {
        let lock = self.lock(project)?;
        self.update(&lock, project, |metadata| {
            if !metadata.remove_version(version) {
                debug!(project = %project, version = %version, "Version absent from metadata");
            }
        })
    }

    /// Newest version by natural order, if any.
    pub fn latest_version(&self, project: &str) -> StoreResult<Option<String>> {
        Ok(self.read(project)?.latest_version().map(str::to_string))
    }

    /// Read-modify-write `project`'s record while `_held` guards it.
    pub fn update<F>(
        &self,
        _held: &ProjectLock,
        project: &str,
        mutate: F,
    ) -> StoreResult<ProjectMetadata>
    where
        F: FnOnce(&mut ProjectMetadata),
    {
        let mut metadata = self.read(project)?;
        if !metadata.is_registered() {
            return Err(StoreError::NotRegistered {
                project: project.to_string(),
            });
        }

        mutate(&mut metadata);
        metadata.sort_versions();
        self.save(project, &metadata)?;

        debug!(
            project = %project,
            versions = metadata.versions.len(),
            "Project metadata updated"
        );
        Ok(metadata)
    }

    fn save(&self, project: &str, metadata: &ProjectMetadata) -> StoreResult<()> {
        let project_dir = self.project_dir(project);
        let content = serde_json::to_string_pretty(metadata)?;

        let mut temp_file = tempfile::Builder::new()
            .prefix(".metadata-")
            .suffix(".tmp")
            .tempfile_in(&project_dir)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(self.metadata_path(project))
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}
