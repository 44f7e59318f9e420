//! # Error Handling
//!
//! Errors raised inside the store. Upload outcomes and deletion results are
//! returned as values (see [`crate::uploader::UploadOutcome`] and
//! [`crate::deletion::DeleteOutcome`]); [`StoreError`] covers everything that is
//! not one of those outcomes: filesystem and serialization failures, request
//! shapes the store refuses outright, and configuration gates.
//!
//! ## Error Classifications
//!
//! - **Validation** ([`ErrorCode::ValidationError`]): bad names, filenames,
//!   filter patterns or registration payloads
//! - **Conflict** ([`ErrorCode::Conflict`]): a project that already exists
//! - **Not Found** ([`ErrorCode::NotFound`]): operations on unregistered projects
//! - **Forbidden** ([`ErrorCode::Forbidden`]): the store is read-only
//! - **Internal** ([`ErrorCode::InternalError`]): I/O, JSON, zip and lock failures

use std::path::PathBuf;

use crate::validation::ValidationError;

/// Machine-readable classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    Conflict,
    NotFound,
    Forbidden,
    TooLarge,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::Conflict => "conflict",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Forbidden => "forbidden",
            ErrorCode::TooLarge => "too_large",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Project '{project}' already exists")]
    AlreadyExists { project: String },

    #[error("Project '{project}' is not registered")]
    NotRegistered { project: String },

    #[error("Invalid archive name '{filename}': expected <name>-<version>.zip")]
    InvalidArchiveName { filename: String },

    #[error("Archive too large: {actual} bytes exceeds maximum {max} bytes")]
    ArchiveTooLarge { actual: u64, max: u64 },

    #[error("Store is in read-only mode")]
    ReadOnly,

    #[error("Invalid filter pattern '{pattern}': {reason}")]
    InvalidFilter { pattern: String, reason: String },

    #[error("Invalid registration request: {}", .0.join("; "))]
    InvalidRequest(Vec<String>),

    #[error("Failed to lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::Validation(_)
            | StoreError::InvalidArchiveName { .. }
            | StoreError::InvalidFilter { .. }
            | StoreError::InvalidRequest(_) => ErrorCode::ValidationError,
            StoreError::AlreadyExists { .. } => ErrorCode::Conflict,
            StoreError::NotRegistered { .. } => ErrorCode::NotFound,
            StoreError::ReadOnly => ErrorCode::Forbidden,
            StoreError::ArchiveTooLarge { .. } => ErrorCode::TooLarge,
            StoreError::Io(_) | StoreError::Json(_) | StoreError::Zip(_) | StoreError::Lock { .. } => {
                ErrorCode::InternalError
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
