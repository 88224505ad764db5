//! Unified file reading strategies
//!
//! Provides consistent handling for:
//! - Non-UTF-8 files
//! - Unreadable files (reported as warnings, never fatal)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Strategy for handling non-UTF-8 content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingStrategy {
    /// Skip non-UTF-8 files entirely
    Skip,
    /// Use lossy conversion (replace invalid bytes)
    #[default]
    Lossy,
}

/// Result of reading a file
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The file content (if successfully read)
    pub content: Option<String>,

    /// Whether lossy conversion was used
    pub lossy_conversion: bool,

    /// Warnings generated during reading
    pub warnings: Vec<FileWarning>,
}

impl FileReadResult {
    pub fn success(content: String) -> Self {
        Self {
            content: Some(content),
            lossy_conversion: false,
            warnings: Vec::new(),
        }
    }

    pub fn dropped(warning: FileWarning) -> Self {
        Self {
            content: None,
            lossy_conversion: false,
            warnings: vec![warning],
        }
    }

    pub fn with_lossy(mut self) -> Self {
        self.lossy_conversion = true;
        self
    }

    pub fn with_warning(mut self, warning: FileWarning) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// Warning codes for non-fatal conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningCode {
    /// File could not be read and was dropped from the scan
    FileRead,
    /// File was dropped because it is not valid UTF-8
    FileSkippedEncoding,
    /// Lossy encoding conversion used
    LossyConversion,
    /// Structural analysis degraded to an issue entry
    Analysis,
    /// Cache entry could not be read or written
    CacheIo,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::FileRead => "FILE_READ",
            WarningCode::FileSkippedEncoding => "FILE_SKIPPED_ENCODING",
            WarningCode::LossyConversion => "LOSSY_CONVERSION",
            WarningCode::Analysis => "ANALYSIS",
            WarningCode::CacheIo => "CACHE_IO",
        }
    }
}

/// A structured warning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWarning {
    pub code: WarningCode,

    pub message: String,

    /// Associated file path (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FileWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Emit through the log
    pub fn log(&self) {
        match &self.path {
            Some(path) => tracing::warn!(code = self.code.as_str(), path = %path, "{}", self.message),
            None => tracing::warn!(code = self.code.as_str(), "{}", self.message),
        }
    }
}

/// Read a file as text according to the encoding strategy
///
/// `display_path` is the root-relative path used in warnings.
pub fn read_text(path: &Path, display_path: &str, encoding: EncodingStrategy) -> FileReadResult {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            return FileReadResult::dropped(
                FileWarning::new(
                    WarningCode::FileRead,
                    format!("Could not read file: {}", e),
                )
                .with_path(display_path),
            );
        }
    };

    match String::from_utf8(bytes) {
        Ok(content) => FileReadResult::success(content),
        Err(err) => match encoding {
            EncodingStrategy::Skip => FileReadResult::dropped(
                FileWarning::new(
                    WarningCode::FileSkippedEncoding,
                    "File contains invalid UTF-8 sequences",
                )
                .with_path(display_path),
            ),
            EncodingStrategy::Lossy => {
                let content = String::from_utf8_lossy(err.as_bytes()).into_owned();
                FileReadResult::success(content)
                    .with_lossy()
                    .with_warning(
                        FileWarning::new(
                            WarningCode::LossyConversion,
                            "Lossy UTF-8 conversion applied (some characters replaced)",
                        )
                        .with_path(display_path),
                    )
            }
        },
    }
}
