//! Configuration
//!
//! Loaded once per invocation and handed explicitly to the scanner and cache.
//! Every field has a default, so a partial JSON file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DoctorError, DoctorResult};
use crate::core::file_reader::EncodingStrategy;
use crate::core::paths::default_cache_dir;
use crate::core::tokenizer::TokenModel;

/// Default per-file size limit (1 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default cumulative size budget (10 MB)
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 10 * 1024 * 1024;

pub const DEFAULT_CACHE_DURATION_HOURS: u64 = 24;

pub const DEFAULT_MAX_PROMPT_TOKENS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files larger than this are skipped (bytes)
    pub max_file_size: u64,

    /// Cumulative size budget for admitted files (bytes)
    pub max_total_size: u64,

    pub cache_enabled: bool,

    /// Cache entries older than this are treated as absent
    pub cache_duration_hours: u64,

    pub enable_static_analysis: bool,

    /// Override for the cache directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Command line of the diagnosis collaborator, e.g. "llm -m gpt-4o"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnose_command: Option<String>,

    /// Warn when the prompt exceeds this many tokens
    pub max_prompt_tokens: usize,

    pub token_model: TokenModel,

    pub encoding: EncodingStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            cache_enabled: true,
            cache_duration_hours: DEFAULT_CACHE_DURATION_HOURS,
            enable_static_analysis: true,
            cache_dir: None,
            diagnose_command: None,
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
            token_model: TokenModel::default(),
            encoding: EncodingStrategy::default(),
        }
    }
}

impl Config {
    /// Load config from `path`, falling back to defaults
    ///
    /// A missing file is not an error. A file that cannot be read or parsed is
    /// logged and ignored.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("Could not load config file: {}", e);
                Self::default()
            }
        }
    }

    /// Strict variant of [`Config::load`]; `Ok(None)` when the file does not exist
    pub fn try_load(path: &Path) -> DoctorResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|e| DoctorError::io(path, e))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| DoctorError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Some(config))
    }

    pub fn save(&self, path: &Path) -> DoctorResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DoctorError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DoctorError::Config(e.to_string()))?;
        fs::write(path, json).map_err(|e| DoctorError::io(path, e))
    }

    /// Effective cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }
}
