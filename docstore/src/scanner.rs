//! # Storage Root Scanning
//!
//! Builds the browsable listing from the directory tree. Every immediate,
//! non-hidden subdirectory of the root is a candidate project; its
//! `metadata.json` decides whether it is listed.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, warn};

use crate::archive::CHANGELOG_FILE;
use crate::error::StoreResult;
use crate::latest::LATEST_POINTER_NAME;
use crate::metadata::{MetadataStore, ProjectMetadata};
use crate::natural::natural_cmp;

/// One row of a project's version listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub version: String,
    /// Upload day (`YYYY-MM-DD`).
    pub upload_date: Option<String>,
    /// For the `latest` entry, the version it stands for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolves_to: Option<String>,
}

/// A project as shown in listings. The unique key is never included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub name: String,
    pub directory: String,
    pub description: String,
    pub owner: String,
    #[serde(rename = "owner-email")]
    pub owner_email: String,
    #[serde(rename = "programming-lang")]
    pub programming_lang: String,
    pub tags: BTreeSet<String>,
    pub has_changelog: bool,
    /// Headed by the `latest` pseudo-entry, then newest first.
    pub versions: Vec<VersionEntry>,
    #[serde(skip)]
    pub path: PathBuf,
}

impl ProjectView {
    fn new(directory: String, path: PathBuf, metadata: ProjectMetadata) -> Self {
        let has_changelog = path.join(CHANGELOG_FILE).is_file();

        let latest = metadata.versions.first().map(|(version, record)| (version.clone(), record));
        let mut versions = Vec::with_capacity(metadata.versions.len() + 1);
        versions.push(VersionEntry {
            version: LATEST_POINTER_NAME.to_string(),
            upload_date: latest.as_ref().map(|(_, record)| record.upload_day().to_string()),
            resolves_to: latest.as_ref().map(|(version, _)| version.clone()),
        });
        versions.extend(metadata.versions.iter().map(|(version, record)| VersionEntry {
            version: version.clone(),
            upload_date: Some(record.upload_day().to_string()),
            resolves_to: None,
        }));

        let name = if metadata.name.is_empty() {
            directory.clone()
        } else {
            metadata.name
        };

        ProjectView {
            name,
            directory,
            description: metadata.description,
            owner: metadata.owner,
            owner_email: metadata.owner_email,
            programming_lang: metadata.programming_lang,
            tags: metadata.tags,
            has_changelog,
            versions,
            path,
        }
    }

    /// Real versions, without the `latest` entry.
    pub fn version_names(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().skip(1).map(|entry| entry.version.as_str())
    }

    /// Whether `version` is listed, counting `latest` when a version exists.
    pub fn has_version(&self, version: &str) -> bool {
        match self.versions.split_first() {
            Some((latest, _)) if version == LATEST_POINTER_NAME => latest.resolves_to.is_some(),
            Some((_, rest)) => rest.iter().any(|entry| entry.version == version),
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    metadata: MetadataStore,
}

impl DirectoryScanner {
    pub fn new(metadata: MetadataStore) -> Self {
        Self { metadata }
    }

    /// All listable projects, sorted by name ignoring case.
    pub fn list_all(&self) -> StoreResult<Vec<ProjectView>> {
        let root = self.metadata.root();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(root = %root.display(), "Storage root does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut projects = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let directory = entry.file_name().to_string_lossy().into_owned();
            if directory.starts_with('.') {
                continue;
            }
            if let Some(view) = self.load(&directory) {
                projects.push(view);
            }
        }

        projects.sort_by(|a, b| natural_cmp(&a.name.to_lowercase(), &b.name.to_lowercase()));
        debug!(count = projects.len(), "Scanned storage root");
        Ok(projects)
    }

    /// One project's view, or `None` when it is not a listable project.
    pub fn project_versions(&self, project: &str) -> Option<ProjectView> {
        if !self.metadata.project_dir(project).is_dir() {
            return None;
        }
        self.load(project)
    }

    fn load(&self, directory: &str) -> Option<ProjectView> {
        let path = self.metadata.project_dir(directory);
        match self.metadata.read(directory) {
            Ok(metadata) if metadata.is_registered() => {
                Some(ProjectView::new(directory.to_string(), path, metadata))
            }
            Ok(_) => {
                warn!(project = %path.display(), "Project does not contain metadata.json");
                None
            }
            Err(e) => {
                warn!(project = %path.display(), error = %e, "Skipping project with unreadable metadata");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ProjectFields;
    use tempfile::TempDir;

    fn register(store: &MetadataStore, name: &str) {
        fs::create_dir(store.project_dir(name)).unwrap();
        store
            .initialize(
                name,
                &ProjectFields {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
    }

    #[test]
    fn test_missing_root_lists_nothing() {
        let temp = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(MetadataStore::new(temp.path().join("absent")));
        assert!(scanner.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_hidden_and_unregistered() {
        let temp = TempDir::new().unwrap();
        let store = MetadataStore::new(temp.path());
        register(&store, "beta");
        register(&store, "Alpha");
        fs::create_dir(temp.path().join(".trash")).unwrap();
        fs::create_dir(temp.path().join("orphan")).unwrap();
        fs::create_dir(temp.path().join("broken")).unwrap();
        fs::write(store.metadata_path("broken"), "{ not json").unwrap();
        fs::write(temp.path().join("stray.txt"), "x").unwrap();

        let names: Vec<String> = DirectoryScanner::new(store)
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_view_heads_versions_with_latest() {
        let temp = TempDir::new().unwrap();
        let store = MetadataStore::new(temp.path());
        register(&store, "sample");
        store.add_version("sample", "1.2.0").unwrap();
        store.add_version("sample", "1.10.0").unwrap();
        fs::write(store.project_dir("sample").join(CHANGELOG_FILE), "log").unwrap();

        let view = DirectoryScanner::new(store)
            .project_versions("sample")
            .unwrap();

        assert!(view.has_changelog);
        assert_eq!(view.versions[0].version, "latest");
        assert_eq!(view.versions[0].resolves_to.as_deref(), Some("1.10.0"));
        assert_eq!(view.version_names().collect::<Vec<_>>(), vec!["1.10.0", "1.2.0"]);
        assert!(view.has_version("latest"));
        assert!(!view.has_version("2.0.0"));
    }

    #[test]
    fn test_view_without_versions() {
        let temp = TempDir::new().unwrap();
        let store = MetadataStore::new(temp.path());
        register(&store, "sample");

        let view = DirectoryScanner::new(store)
            .project_versions("sample")
            .unwrap();
        assert_eq!(view.versions.len(), 1);
        assert_eq!(view.versions[0].resolves_to, None);
        assert!(!view.has_version("latest"));
        assert!(!view.has_changelog);
    }

    #[test]
    fn test_view_omits_unique_key() {
        let temp = TempDir::new().unwrap();
        let store = MetadataStore::new(temp.path());
        register(&store, "sample");

        let view = DirectoryScanner::new(store)
            .project_versions("sample")
            .unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("unique-key").is_none());
        assert_eq!(json["versions"][0]["version"], "latest");
    }
}
