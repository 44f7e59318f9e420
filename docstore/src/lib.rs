//! # Documentation Store
//!
//! Self-hosted storage for versioned documentation bundles. Each project owns
//! a directory under the storage root; each uploaded version is an extracted
//! archive inside it, described by the project's `metadata.json`.
//!
//! ```text
//! <root>/
//! └── sample-proj/
//!     ├── metadata.json     project record, versions newest first
//!     ├── latest            name of the newest version
//!     ├── changelog.html    optional, hoisted from the newest upload
//!     ├── .lock             per-project advisory lock
//!     ├── 1.10.0/index.html
//!     └── 1.2.0/index.html
//! ```
//!
//! ## Features
//!
//! - **Registration**: one unique key per project, issued once
//! - **Upload**: `<name>-<version>.zip` archives with a root `index.html`,
//!   extracted to a staging directory and promoted by rename
//! - **Latest resolution**: a pointer file rewritten after every upload and deletion
//! - **Deletion**: key-checked removal of a single version
//! - **Listing and search**: name prefix pattern, language and tag filters
//!
//! ## Key Modules
//!
//! - [`store`]: the [`DocStore`] facade
//! - [`config`]: [`StoreConfig`] and deployment profiles
//! - [`error`]: [`StoreError`] and error classification
//! - [`validation`]: name and version checks run before any path is built

pub mod archive;
pub mod config;
pub mod deletion;
pub mod error;
pub mod filter;
pub mod latest;
pub mod lock;
pub mod metadata;
pub mod natural;
pub mod registration;
pub mod scanner;
pub mod store;
pub mod uploader;
pub mod validation;

pub use config::{Profile, StoreConfig};
pub use deletion::DeleteOutcome;
pub use error::{ErrorCode, StoreError, StoreResult};
pub use filter::ProjectFilter;
pub use metadata::{ProjectMetadata, VersionRecord};
pub use registration::{RegisterRequest, RegistrationOutcome};
pub use scanner::{ProjectView, VersionEntry};
pub use store::DocStore;
pub use uploader::{FailureStage, UploadFailure, UploadOutcome, UploadStatus};
pub use validation::{is_valid_name, is_valid_version, ValidationError};
