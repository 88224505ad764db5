//! Two-pass project scan
//!
//! The budget pass walks the tree and decides admission from file metadata
//! alone. The read pass walks the tree again with the same filter and loads the
//! content of every admitted path. Both passes share one traversal (walkdir,
//! entries sorted by file name, excluded directories pruned before descent), so
//! admission is reproducible on an unchanged tree.

use std::collections::HashMap;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::backends::filter::PathFilter;
use crate::core::config::{Config, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_TOTAL_SIZE};
use crate::core::error::{DoctorError, DoctorResult};
use crate::core::file_reader::{read_text, EncodingStrategy, FileWarning, WarningCode};
use crate::core::model::{AdmittedFile, LoadedFile, ScanStats, SkipReason, SkippedFile, Snapshot};
use crate::core::paths::make_relative;
use crate::core::util::mtime_ns;

/// Scan options
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Caller ignore patterns, in the order given
    pub patterns: Vec<String>,
    pub max_file_size: u64,
    pub max_total_size: u64,
    pub encoding: EncodingStrategy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            encoding: EncodingStrategy::default(),
        }
    }
}

impl ScanOptions {
    pub fn from_config(config: &Config, patterns: Vec<String>) -> Self {
        Self {
            patterns,
            max_file_size: config.max_file_size,
            max_total_size: config.max_total_size,
            encoding: config.encoding,
        }
    }
}

/// Outcome of the budget pass
#[derive(Debug, Clone, Default)]
pub struct Budget {
    /// Admitted files in traversal order
    pub admitted: Vec<AdmittedFile>,
    /// Skipped files in traversal order
    pub skipped: Vec<SkippedFile>,
    pub total_bytes: u64,
}

/// A file that survived the path filter, before any budget decision
struct Candidate {
    relative: String,
    path: PathBuf,
    metadata: Metadata,
}

pub struct TreeScanner {
    root: PathBuf,
    filter: PathFilter,
    options: ScanOptions,
}

impl TreeScanner {
    /// Create a scanner rooted at `root`
    ///
    /// Fails with `InvalidPath` if `root` is not a directory, or
    /// `InvalidPattern` if an ignore pattern does not compile.
    pub fn new(root: &Path, options: ScanOptions) -> DoctorResult<Self> {
        let invalid = || DoctorError::InvalidPath {
            path: root.to_path_buf(),
        };
        if !root.is_dir() {
            return Err(invalid());
        }
        let root = root.canonicalize().map_err(|_| invalid())?;
        let filter = PathFilter::new(&options.patterns)?;
        tracing::debug!(root = %root.display(), patterns = ?filter.patterns(), "Scanner ready");

        Ok(Self {
            root,
            filter,
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree yielding every file the path filter lets through
    fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                match make_relative(entry.path(), &self.root) {
                    Some(rel) => !self.filter.excluded(&rel, true),
                    None => false,
                }
            })
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::debug!("Skipping unreadable entry: {}", e);
                        return None;
                    }
                };
                if entry.file_type().is_dir() {
                    return None;
                }
                let relative = make_relative(entry.path(), &self.root)?;
                if self.filter.excluded(&relative, false) {
                    return None;
                }
                // Follows symlinks, so a link to a regular file counts as that file
                let metadata = match fs::metadata(entry.path()) {
                    Ok(m) if m.is_file() => m,
                    Ok(_) => return None,
                    Err(e) => {
                        tracing::debug!(path = %relative, "Cannot stat file: {}", e);
                        return None;
                    }
                };
                Some(Candidate {
                    relative,
                    path: entry.into_path(),
                    metadata,
                })
            })
    }

    /// First pass: decide admission from file sizes in traversal order
    pub fn budget(&self) -> Budget {
        let mut budget = Budget::default();

        for candidate in self.candidates() {
            let size = candidate.metadata.len();
            let reason = if size > self.options.max_file_size {
                Some(SkipReason::SingleFileSizeExceeded)
            } else if budget.total_bytes + size > self.options.max_total_size {
                Some(SkipReason::CumulativeBudgetExceeded)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    tracing::debug!(path = %candidate.relative, size, reason = reason.as_str(), "Skipped");
                    budget.skipped.push(SkippedFile {
                        path: candidate.relative,
                        size,
                        reason,
                    });
                }
                None => {
                    budget.total_bytes += size;
                    budget.admitted.push(AdmittedFile {
                        mtime_ns: mtime_ns(&candidate.metadata),
                        path: candidate.relative,
                        abs_path: candidate.path,
                        size,
                    });
                }
            }
        }

        budget
    }

    /// Run both passes
    ///
    /// Fails with `EmptyProject` if nothing is admitted. Files that cannot be
    /// read are dropped with a warning.
    pub fn scan(&self) -> DoctorResult<Snapshot> {
        let budget = self.budget();
        if budget.admitted.is_empty() {
            return Err(DoctorError::EmptyProject {
                root: self.root.clone(),
            });
        }

        let mut admitted: HashMap<String, AdmittedFile> = budget
            .admitted
            .into_iter()
            .map(|f| (f.path.clone(), f))
            .collect();

        let mut files = Vec::with_capacity(admitted.len());
        let mut warnings = Vec::new();

        for candidate in self.candidates() {
            let Some(file) = admitted.remove(&candidate.relative) else {
                continue;
            };
            tracing::debug!(path = %file.path, "Reading");

            let result = read_text(&file.abs_path, &file.path, self.options.encoding);
            if result.lossy_conversion {
                tracing::debug!(path = %file.path, "Read with lossy UTF-8 conversion");
            }
            for warning in &result.warnings {
                warning.log();
            }
            warnings.extend(result.warnings);

            if let Some(content) = result.content {
                files.push(LoadedFile { file, content });
            }
        }

        // Admitted in the first pass but gone by the second
        let mut vanished: Vec<_> = admitted.into_keys().collect();
        vanished.sort();
        for path in vanished {
            let warning = FileWarning::new(
                WarningCode::FileRead,
                "File disappeared between scan passes",
            )
            .with_path(path);
            warning.log();
            warnings.push(warning);
        }

        if files.is_empty() {
            return Err(DoctorError::EmptyProject {
                root: self.root.clone(),
            });
        }

        let stats = ScanStats {
            total_files: files.len(),
            total_bytes: files.iter().map(|f| f.file.size).sum(),
            skipped: budget.skipped,
        };

        Ok(Snapshot {
            root: self.root.clone(),
            files,
            stats,
            warnings,
        })
    }
}

/// Scan `root` with `options`
#[cfg(test)]
pub fn scan_project(root: &Path, options: ScanOptions) -> DoctorResult<Snapshot> {
    TreeScanner::new(root, options)?.scan()
}
