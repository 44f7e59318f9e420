//! # Version Upload
//!
//! Turns an uploaded `<name>-<version>.zip` into `<root>/<name>/<version>/`.
//!
//! ## Upload Sequence
//!
//! 1. Parse the filename (split on the last `-` after stripping `.zip`)
//! 2. Validate the project name, require a registered project, validate the version
//! 3. Compare the supplied unique key with the stored one
//! 4. Refuse to replace an existing version unless re-upload was requested
//! 5. Require a zip with `index.html` at its root
//! 6. Extract into a staging directory next to the version directory
//! 7. Promote: move any previous version aside, rename staging into place,
//!    then delete the previous copy
//! 8. Record the version, refresh the latest pointer, hoist `changelog.html`
//!
//! Steps 4 through 8 run under the project lock. Each rejection yields a
//! distinct [`UploadStatus`]; filesystem failures yield [`UploadStatus::Error`]
//! with an [`UploadFailure`] naming the stage that failed.

use std::fmt;
use std::fs;
use std::io::{self, Read, Seek};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::archive::{parse_archive_filename, DocArchive, CHANGELOG_FILE};
use crate::error::{StoreError, StoreResult};
use crate::latest::LatestResolver;
use crate::metadata::{MetadataStore, VersionRecord};
use crate::validation::{is_valid_name, is_valid_version};

/// Result code of an upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Ok,
    NotRegistered,
    InvalidName,
    InvalidVersion,
    InvalidUniqueKey,
    AlreadyExists,
    NotAValidZipFile,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Ok => "OK",
            UploadStatus::NotRegistered => "NOT_REGISTERED",
            UploadStatus::InvalidName => "INVALID_NAME",
            UploadStatus::InvalidVersion => "INVALID_VERSION",
            UploadStatus::InvalidUniqueKey => "INVALID_UNIQUE_KEY",
            UploadStatus::AlreadyExists => "ALREADY_EXISTS",
            UploadStatus::NotAValidZipFile => "NOT_A_VALID_ZIP_FILE",
            UploadStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of the upload that failed with [`UploadStatus::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Staging,
    Extraction,
    Promotion,
    Metadata,
    LatestPointer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub stage: FailureStage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub project: String,
    pub version: String,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<UploadFailure>,
}

impl UploadOutcome {
    fn new(project: &str, version: &str, status: UploadStatus) -> Self {
        Self {
            project: project.to_string(),
            version: version.to_string(),
            status,
            cause: None,
        }
    }

    fn failed(project: &str, version: &str, stage: FailureStage, err: impl fmt::Display) -> Self {
        let message = err.to_string();
        error!(
            project = %project,
            version = %version,
            stage = ?stage,
            error = %message,
            "Upload failed"
        );
        Self {
            cause: Some(UploadFailure { stage, message }),
            ..Self::new(project, version, UploadStatus::Error)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == UploadStatus::Ok
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactUploader {
    metadata: MetadataStore,
    latest: LatestResolver,
}

impl ArtifactUploader {
    pub fn new(metadata: MetadataStore, latest: LatestResolver) -> Self {
        Self { metadata, latest }
    }

    /// Upload the archive named `filename`, read from `archive`.
    ///
    /// Only a filename that does not follow `<name>-<version>.zip` is an
    /// `Err`; every other result, including unreadable metadata or a lock
    /// that cannot be taken, is reported through [`UploadOutcome`].
    pub fn upload<R: Read + Seek>(
        &self,
        archive: R,
        filename: &str,
        supplied_key: &str,
        allow_reupload: bool,
    ) -> StoreResult<UploadOutcome> {
        let (name, version) =
            parse_archive_filename(filename).ok_or_else(|| StoreError::InvalidArchiveName {
                filename: filename.to_string(),
            })?;
        let reject = |status: UploadStatus| {
            warn!(project = %name, version = %version, status = %status, "Upload rejected");
            Ok(UploadOutcome::new(&name, &version, status))
        };

        if !is_valid_name(&name) {
            return reject(UploadStatus::InvalidName);
        }

        let project_dir = self.metadata.project_dir(&name);
        if !project_dir.is_dir() {
            return reject(UploadStatus::NotRegistered);
        }

        if !is_valid_version(&version) {
            return reject(UploadStatus::InvalidVersion);
        }

        let stored = match self.metadata.read(&name) {
            Ok(stored) => stored,
            Err(e) => return Ok(UploadOutcome::failed(&name, &version, FailureStage::Metadata, e)),
        };
        if !stored.is_registered() {
            return reject(UploadStatus::NotRegistered);
        }
        if stored.unique_key != supplied_key {
            return reject(UploadStatus::InvalidUniqueKey);
        }

        let lock = match self.metadata.lock(&name) {
            Ok(lock) => lock,
            Err(e) => return Ok(UploadOutcome::failed(&name, &version, FailureStage::Staging, e)),
        };
        let version_dir = project_dir.join(&version);

        if version_dir.exists() && !allow_reupload {
            return reject(UploadStatus::AlreadyExists);
        }

        let mut archive = match DocArchive::open(archive) {
            Ok(archive) if archive.has_root_index() => archive,
            Ok(_) => {
                warn!(project = %name, version = %version, "Archive has no root index.html");
                return reject(UploadStatus::NotAValidZipFile);
            }
            Err(e) => {
                warn!(project = %name, version = %version, error = %e, "Unreadable archive");
                return reject(UploadStatus::NotAValidZipFile);
            }
        };

        let staging = match tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&project_dir)
        {
            Ok(dir) => dir,
            Err(e) => return Ok(UploadOutcome::failed(&name, &version, FailureStage::Staging, e)),
        };

        if let Err(e) = archive.extract_to(staging.path()) {
            return Ok(UploadOutcome::failed(
                &name,
                &version,
                FailureStage::Extraction,
                e,
            ));
        }

        if let Err(e) = promote_directory(staging.path(), &version_dir) {
            return Ok(UploadOutcome::failed(
                &name,
                &version,
                FailureStage::Promotion,
                e,
            ));
        }
        drop(staging);

        if let Err(e) = self.metadata.update(&lock, &name, |metadata| {
            metadata.insert_version(&version, VersionRecord::now())
        }) {
            return Ok(UploadOutcome::failed(
                &name,
                &version,
                FailureStage::Metadata,
                e,
            ));
        }

        if let Err(e) = self.latest.refresh_locked(&lock, &name) {
            return Ok(UploadOutcome::failed(
                &name,
                &version,
                FailureStage::LatestPointer,
                e,
            ));
        }

        hoist_changelog(&version_dir, &project_dir);

        info!(project = %name, version = %version, reupload = allow_reupload, "Version uploaded");
        Ok(UploadOutcome::new(&name, &version, UploadStatus::Ok))
    }
}

/// Replace `target` with the fully populated `staged` directory.
///
/// A previous `target` is renamed aside first and only deleted once the new
/// directory is in place; if the final rename fails the previous copy is put
/// back.
fn promote_directory(staged: &Path, target: &Path) -> io::Result<()> {
    if !target.exists() {
        return fs::rename(staged, target);
    }

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let aside = target.with_file_name(format!(".{}.previous-{}", file_name, uuid::Uuid::new_v4()));

    fs::rename(target, &aside)?;

    if let Err(e) = fs::rename(staged, target) {
        if let Err(restore) = fs::rename(&aside, target) {
            error!(
                version_dir = %target.display(),
                aside = %aside.display(),
                error = %restore,
                "Failed to restore previous version directory"
            );
        }
        return Err(e);
    }

    if let Err(e) = fs::remove_dir_all(&aside) {
        warn!(path = %aside.display(), error = %e, "Failed to remove replaced version directory");
    }
    Ok(())
}

/// Move `changelog.html` from a version directory to its project directory.
fn hoist_changelog(version_dir: &Path, project_dir: &Path) {
    let changelog = version_dir.join(CHANGELOG_FILE);
    if !changelog.is_file() {
        return;
    }

    let dest = project_dir.join(CHANGELOG_FILE);
    match fs::rename(&changelog, &dest) {
        Ok(()) => info!(path = %dest.display(), "Changelog moved to project directory"),
        Err(e) => warn!(
            path = %changelog.display(),
            error = %e,
            "Failed to move changelog to project directory"
        ),
    }
}
