//! Markdown report file

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DoctorError, DoctorResult};
use crate::core::model::ScanStats;
use crate::core::util::format_kb;

const REPORT_TITLE: &str = "# Project Doctor - Diagnosis Report";

/// Everything printed above the diagnosis text
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub project_type: String,
    pub project_path: PathBuf,
    pub generated: DateTime<Local>,
    pub files_processed: usize,
    pub total_bytes: u64,
    /// The diagnosis came from the cache
    pub cached: bool,
}

impl ReportHeader {
    pub fn new(project_type: &str, project_path: &Path, stats: &ScanStats, cached: bool) -> Self {
        Self {
            project_type: project_type.to_string(),
            project_path: project_path.to_path_buf(),
            generated: Local::now(),
            files_processed: stats.total_files,
            total_bytes: stats.total_bytes,
            cached,
        }
    }
}

pub fn render_report(header: &ReportHeader, diagnosis: &str) -> String {
    let mut out = String::from(REPORT_TITLE);
    if header.cached {
        out.push_str(" (Cached)");
    }
    out.push_str("\n\n");
    out.push_str(&format!("**Project:** {}\n", header.project_type));
    out.push_str(&format!("**Path:** {}\n", header.project_path.display()));
    out.push_str(&format!(
        "**Generated:** {}\n",
        header.generated.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("**Files Processed:** {}\n", header.files_processed));
    out.push_str(&format!("**Total Size:** {}\n\n", format_kb(header.total_bytes)));
    out.push_str("---\n\n");
    out.push_str(diagnosis);
    out
}

pub fn write_report(path: &Path, header: &ReportHeader, diagnosis: &str) -> DoctorResult<()> {
    fs::write(path, render_report(header, diagnosis)).map_err(|e| DoctorError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn header(cached: bool) -> ReportHeader {
        ReportHeader {
            project_type: "Python CLI".to_string(),
            project_path: PathBuf::from("/work/app"),
            generated: Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
            files_processed: 12,
            total_bytes: 1536,
            cached,
        }
    }

    #[test]
    fn test_render_report() {
        let text = render_report(&header(false), "All good.");
        assert_eq!(
            text,
            "# Project Doctor - Diagnosis Report\n\n\
             **Project:** Python CLI\n\
             **Path:** /work/app\n\
             **Generated:** 2026-03-04 05:06:07\n\
             **Files Processed:** 12\n\
             **Total Size:** 1.5KB\n\n\
             ---\n\n\
             All good."
        );
    }

    #[test]
    fn test_cached_title() {
        let text = render_report(&header(true), "x");
        assert!(text.starts_with("# Project Doctor - Diagnosis Report (Cached)\n\n"));
    }

    #[test]
    fn test_write_report_failure_is_io_error() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("missing-dir").join("report.md");
        assert!(matches!(
            write_report(&target, &header(false), "x"),
            Err(DoctorError::Io { .. })
        ));

        let ok = temp.path().join("report.md");
        write_report(&ok, &header(false), "body").unwrap();
        assert!(fs::read_to_string(ok).unwrap().ends_with("---\n\nbody"));
    }
}
