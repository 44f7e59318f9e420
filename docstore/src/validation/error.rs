//! # Validation Error Types

/// Error types for validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{what} cannot be empty")]
    Empty { what: &'static str },

    #[error("{what} too long: {actual} exceeds maximum {max}")]
    TooLong {
        what: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("Invalid characters in {what}: {input}")]
    InvalidCharacters { what: &'static str, input: String },

    #[error("'{input}' is reserved and cannot be used as a {what}")]
    Reserved { what: &'static str, input: String },

    #[error("File size exceeds limit: {actual} > {max}")]
    FileTooLarge { actual: u64, max: u64 },
}
