//! Diagnosis cache store
//!
//! One JSON file per fingerprint. Entries expire lazily: an expired entry stays
//! on disk until the next lookup for its key deletes it. Any read problem is a
//! cache miss, and writes go through a temporary file plus rename so a failed
//! write never leaves a half-written entry behind.

use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cache::entry::{CacheEntry, ENTRY_EXTENSION};
use crate::core::error::{DoctorError, DoctorResult};
use crate::core::file_reader::{FileWarning, WarningCode};

pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    /// Cache rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `fingerprint`
    pub fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", fingerprint, ENTRY_EXTENSION))
    }

    /// Stored result, if present and not older than `max_age_hours`
    pub fn get(&self, fingerprint: &str, max_age_hours: u64) -> Option<String> {
        self.get_at(fingerprint, max_age_hours, Utc::now())
    }

    pub fn get_at(&self, fingerprint: &str, max_age_hours: u64, now: DateTime<Utc>) -> Option<String> {
        let path = self.entry_path(fingerprint);
        if !path.exists() {
            return None;
        }

        let entry = match read_entry(&path) {
            Ok(entry) => entry,
            Err(e) => {
                FileWarning::new(WarningCode::CacheIo, format!("Ignoring unreadable cache entry: {}", e))
                    .with_path(path.display().to_string())
                    .log();
                return None;
            }
        };

        if entry.is_expired(max_age_hours, now) {
            tracing::debug!(fingerprint, "Cache entry expired, removing");
            if let Err(e) = fs::remove_file(&path) {
                FileWarning::new(WarningCode::CacheIo, format!("Could not remove expired entry: {}", e))
                    .with_path(path.display().to_string())
                    .log();
            }
            return None;
        }

        tracing::debug!(fingerprint, "Cache hit");
        Some(entry.result)
    }

    /// Store `result` under `fingerprint`, replacing any previous entry
    pub fn put(&self, fingerprint: &str, result: &str) -> DoctorResult<()> {
        self.put_at(fingerprint, result, Utc::now())
    }

    pub fn put_at(&self, fingerprint: &str, result: &str, created: DateTime<Utc>) -> DoctorResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| DoctorError::cache_io(&self.dir, e))?;

        let path = self.entry_path(fingerprint);
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", fingerprint, std::process::id()));
        let json = serde_json::to_string(&CacheEntry::new(result, created))
            .map_err(|e| DoctorError::cache_io(&path, e))?;

        let written = write_file(&tmp, json.as_bytes()).and_then(|_| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(DoctorError::cache_io(&path, e));
        }
        Ok(())
    }

    /// Remove every entry; returns how many were removed
    pub fn clear(&self) -> DoctorResult<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        let entries = fs::read_dir(&self.dir).map_err(|e| DoctorError::cache_io(&self.dir, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                fs::remove_file(&path).map_err(|e| DoctorError::cache_io(&path, e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn read_entry(path: &Path) -> DoctorResult<CacheEntry> {
    let content = fs::read_to_string(path).map_err(|e| DoctorError::cache_io(path, e))?;
    serde_json::from_str(&content).map_err(|e| DoctorError::cache_io(path, e))
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
