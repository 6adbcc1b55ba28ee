//! Error types for multiapp-edit.
//!
//! This module defines error types that distinguish between:
//! - Validation errors: the request itself is malformed (bad pattern, splice out of
//!   bounds). Nothing is written.
//! - Missing targets: the file a patch was aimed at does not exist.
//! - I/O errors: reading or writing the target failed.

use camino::Utf8PathBuf;
use thiserror::Error;

/// The top-level error type for multiapp-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Patches only apply to files a previous step created.
    #[error("patch target {path} does not exist")]
    MissingTarget { path: Utf8PathBuf },

    #[error("io error: {0:#}")]
    Io(#[from] anyhow::Error),
}

/// Requests rejected before any file is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "splice of {length} line(s) at offset {offset} is out of bounds for a file of {lines} line(s)"
    )]
    SpliceOutOfBounds {
        offset: i64,
        length: usize,
        lines: usize,
    },

    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl EditError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EditError::Validation(_))
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;
