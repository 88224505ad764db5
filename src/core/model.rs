//! Snapshot model
//!
//! The data a scan produces: which files were admitted (with the metadata the
//! fingerprint is built from), which were skipped and why, and the aggregate stats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::file_reader::FileWarning;

/// A file that passed filtering and both size budgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmittedFile {
    /// Path relative to the scan root, using '/' as separator
    pub path: String,

    /// Absolute path on disk
    #[serde(skip)]
    pub abs_path: PathBuf,

    /// Size in bytes as seen by the budget pass
    pub size: u64,

    /// Modification time in nanoseconds since the Unix epoch
    pub mtime_ns: i64,
}

/// Why a discovered file was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The file alone is larger than `max_file_size`
    SingleFileSizeExceeded,
    /// Admitting the file would push the running total past `max_total_size`
    CumulativeBudgetExceeded,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::SingleFileSizeExceeded => "single_file_size_exceeded",
            SkipReason::CumulativeBudgetExceeded => "cumulative_budget_exceeded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub size: u64,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            SkipReason::SingleFileSizeExceeded => write!(
                f,
                "{} (size: {})",
                self.path,
                crate::core::util::format_kb(self.size)
            ),
            SkipReason::CumulativeBudgetExceeded => {
                write!(f, "{} (total size limit reached)", self.path)
            }
        }
    }
}

/// Aggregate scan statistics (derived, never persisted)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub total_bytes: u64,
    /// Skipped files in traversal order
    pub skipped: Vec<SkippedFile>,
}

/// An admitted file together with the content read in the second pass
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub file: AdmittedFile,
    pub content: String,
}

/// The outcome of a full two-pass scan
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub root: PathBuf,
    /// Admitted and successfully read files, in traversal order
    pub files: Vec<LoadedFile>,
    pub stats: ScanStats,
    /// Non-fatal problems hit while reading
    pub warnings: Vec<FileWarning>,
}

impl Snapshot {
    pub fn admitted(&self) -> impl Iterator<Item = &AdmittedFile> {
        self.files.iter().map(|f| &f.file)
    }
}
