//! # Input Validation
//!
//! Syntax checks that run before any filesystem path is built from user input.
//! Project names and version strings become directory names under the storage
//! root, so these checks are the only barrier against path escape.
//!
//! ```rust
//! use docstore::validation::{is_valid_name, is_valid_version};
//!
//! assert!(is_valid_name("my_docs-site"));
//! assert!(!is_valid_name("../etc"));
//! assert!(is_valid_version("1.10.0-rc1"));
//! assert!(!is_valid_version("1.0/evil"));
//! ```

pub mod error;
pub mod limits;
pub mod names;

pub use self::{
    error::ValidationError,
    limits::{validate_archive_size, MAX_NAME_LENGTH, MAX_VERSION_LENGTH},
    names::{
        is_valid_name, is_valid_version, validate_project_name, validate_version, RESERVED_VERSIONS,
    },
};

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
