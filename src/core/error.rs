//! Error taxonomy
//!
//! Fatal conditions are `DoctorError` variants. Non-fatal conditions (file read,
//! analysis, cache I/O) are `FileWarning`s collected alongside the result, see
//! `core::file_reader`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoctorError {
    /// The scan root does not exist or is not a directory
    #[error("The path '{}' is not a valid directory", path.display())]
    InvalidPath { path: PathBuf },

    /// Nothing survived filtering and size budgeting
    #[error("No readable files found in '{}'", root.display())]
    EmptyProject { root: PathBuf },

    /// A user supplied ignore pattern does not compile
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache I/O error on '{}': {reason}", path.display())]
    CacheIo { path: PathBuf, reason: String },

    /// Failure reported by the diagnosis collaborator, passed through as-is
    #[error("Diagnosis failed: {0}")]
    Collaborator(String),
}

impl DoctorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DoctorError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn cache_io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DoctorError::CacheIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error must abort the whole operation
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DoctorError::CacheIo { .. })
    }
}

pub type DoctorResult<T> = std::result::Result<T, DoctorError>;
