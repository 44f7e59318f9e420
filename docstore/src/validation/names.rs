//! # Input Validation: Project Names and Versions
//!
//! Project names accept `[A-Za-z0-9_-]+`, versions accept `[A-Za-z0-9.-]+`.
//! Neither class admits `/`, `\` or NUL. The version class admits dots, so a
//! version may not start with `.` (this covers `.`, `..` and the store's hidden
//! staging and lock entries), and the names of files the store keeps in a
//! project directory are reserved.

use crate::validation::error::ValidationError;
use crate::validation::limits::{MAX_NAME_LENGTH, MAX_VERSION_LENGTH};
use crate::validation::ValidationResult;

/// Version strings that would collide with entries in a project directory.
pub const RESERVED_VERSIONS: &[&str] = &["latest", "metadata.json", "changelog.html"];

fn name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

fn version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-')
}

/// Returns `true` when `name` is a syntactically valid project name.
pub fn is_valid_name(name: &str) -> bool {
    validate_project_name(name).is_ok()
}

/// Returns `true` when `version` is a syntactically valid version string.
pub fn is_valid_version(version: &str) -> bool {
    validate_version(version).is_ok()
}

/// Validate a project name, reporting why it was rejected.
pub fn validate_project_name(name: &str) -> ValidationResult<&str> {
    const WHAT: &str = "project name";

    if name.is_empty() {
        return Err(ValidationError::Empty { what: WHAT });
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            what: WHAT,
            actual: name.len(),
            max: MAX_NAME_LENGTH,
        });
    }

    if !name.chars().all(name_char) {
        return Err(ValidationError::InvalidCharacters {
            what: WHAT,
            input: name.to_string(),
        });
    }

    Ok(name)
}

/// Validate a version string, reporting why it was rejected.
pub fn validate_version(version: &str) -> ValidationResult<&str> {
    const WHAT: &str = "version";

    if version.is_empty() {
        return Err(ValidationError::Empty { what: WHAT });
    }

    if version.len() > MAX_VERSION_LENGTH {
        return Err(ValidationError::TooLong {
            what: WHAT,
            actual: version.len(),
            max: MAX_VERSION_LENGTH,
        });
    }

    if !version.chars().all(version_char) {
        return Err(ValidationError::InvalidCharacters {
            what: WHAT,
            input: version.to_string(),
        });
    }

    if version.starts_with('.') || RESERVED_VERSIONS.contains(&version) {
        return Err(ValidationError::Reserved {
            what: WHAT,
            input: version.to_string(),
        });
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["docs", "Sample-Proj", "my_project", "a", "ABC-123_x"] {
            assert!(is_valid_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "", "../etc", "a/b", "a\\b", "with space", "dotted.name", "nul\0", "ünïcode",
        ] {
            assert!(!is_valid_name(name), "{name:?} should be invalid");
        }
        assert!(!is_valid_name(&"a".repeat(MAX_NAME_LENGTH + 1)));
    }

    #[test]
    fn test_valid_versions() {
        for version in ["1.0.0", "1.10.0", "2024.01", "v2", "1.0.0-rc1", "nightly"] {
            assert!(is_valid_version(version), "{version} should be valid");
        }
    }

    #[test]
    fn test_invalid_versions() {
        for version in [
            "", "1.0/2", "..", ".", ".lock", "latest", "metadata.json", "1_0", "1.0 beta", "1\\0",
        ] {
            assert!(!is_valid_version(version), "{version:?} should be invalid");
        }
    }

    #[test]
    fn test_validation_error_kinds() {
        assert_eq!(
            validate_project_name(""),
            Err(ValidationError::Empty {
                what: "project name"
            })
        );
        assert!(matches!(
            validate_version(".."),
            Err(ValidationError::Reserved { .. })
        ));
        assert!(matches!(
            validate_version("../x"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }
}
