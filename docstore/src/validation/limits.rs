//! # Input Validation: Size Limits

use crate::validation::error::ValidationError;
use crate::validation::ValidationResult;

/// Maximum accepted project name length; names become directory names.
pub const MAX_NAME_LENGTH: usize = 214;

/// Maximum accepted version string length
pub const MAX_VERSION_LENGTH: usize = 64;

/// Check an archive size against the configured upload limit.
pub fn validate_archive_size(size: u64, max_size: u64) -> ValidationResult<()> {
    if size > max_size {
        return Err(ValidationError::FileTooLarge {
            actual: size,
            max: max_size,
        });
    }
    Ok(())
}
