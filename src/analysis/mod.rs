//! Static analysis
//!
//! Lightweight, file-type-aware inspection of admitted files. The analyzer never
//! fails: anything that goes wrong while inspecting a file becomes an issue
//! string on that file's result.
//!
//! Provides:
//! - python: syntax-tree metrics and checks for structured source
//! - script: textual pattern checks for script-like files

pub mod python;
pub mod script;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::file_reader::{FileWarning, WarningCode};
use crate::core::model::Snapshot;
use crate::core::util::group_thousands;

/// Number of issues listed in the summary before truncating
pub const SUMMARY_ISSUE_CAP: usize = 10;

/// Which branch of the analyzer a file goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFamily {
    /// Parsed into a syntax tree (Python)
    Structured,
    /// Checked with textual patterns (JavaScript/TypeScript)
    Script,
    Other,
}

impl SourceFamily {
    /// Classify by file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("py") => SourceFamily::Structured,
            Some("js") | Some("ts") | Some("jsx") | Some("tsx") => SourceFamily::Script,
            _ => SourceFamily::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureMetrics {
    pub functions: usize,
    pub classes: usize,
    /// functions + 2 * classes
    pub complexity_score: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCount {
    pub pattern: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptMetrics {
    /// Occurrences of every checked pattern, matched or not
    pub patterns: Vec<PatternCount>,
}

/// Language specific metrics, one variant per analyzer branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LanguageMetrics {
    Structured(StructureMetrics),
    Script(ScriptMetrics),
    /// Unrecognized file, or structured source that failed to parse
    SizeOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_path: String,
    pub lines_of_code: usize,
    pub size_bytes: usize,
    pub metrics: LanguageMetrics,
    /// Issues in discovery order
    pub issues: Vec<String>,
}

/// Analyze one file
pub fn analyze(relative_path: &str, content: &str) -> AnalysisResult {
    let mut issues = Vec::new();
    let metrics = match SourceFamily::from_path(Path::new(relative_path)) {
        SourceFamily::Structured => match python::analyze(content, &mut issues) {
            Ok(metrics) => metrics,
            Err(message) => {
                FileWarning::new(WarningCode::Analysis, message.as_str())
                    .with_path(relative_path)
                    .log();
                issues.push(format!("Analysis error: {}", message));
                LanguageMetrics::SizeOnly
            }
        },
        SourceFamily::Script => LanguageMetrics::Script(script::analyze(content, &mut issues)),
        SourceFamily::Other => LanguageMetrics::SizeOnly,
    };

    AnalysisResult {
        file_path: relative_path.to_string(),
        lines_of_code: count_lines(content),
        size_bytes: content.len(),
        metrics,
        issues,
    }
}

/// Line count with the same boundaries as Python's `str.splitlines`
///
/// Besides `\n` and `\r\n` this breaks on a bare `\r` and on the Unicode line
/// and paragraph separators. A trailing break does not start a new line.
fn count_lines(content: &str) -> usize {
    let mut lines = 0;
    let mut open = false;
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        let is_break = matches!(
            c,
            '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
                | '\u{2028}' | '\u{2029}'
        );
        if is_break {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            lines += 1;
            open = false;
        } else {
            open = true;
        }
    }
    lines + usize::from(open)
}

/// Analyze every file of a snapshot, in scan order
pub fn analyze_snapshot(snapshot: &Snapshot) -> Vec<AnalysisResult> {
    snapshot
        .files
        .iter()
        .map(|f| analyze(&f.file.path, &f.content))
        .collect()
}

/// Aggregate over all results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub files_analyzed: usize,
    pub total_lines: usize,
    pub total_issues: usize,
    /// First issues in file-then-discovery order, as "path: issue"
    pub top_issues: Vec<String>,
    /// Issues left out of `top_issues`
    pub remaining_issues: usize,
}

impl AnalysisSummary {
    pub fn from_results(results: &[AnalysisResult], cap: usize) -> Self {
        let total_lines = results.iter().map(|r| r.lines_of_code).sum();
        let total_issues: usize = results.iter().map(|r| r.issues.len()).sum();
        let top_issues: Vec<String> = results
            .iter()
            .flat_map(|r| r.issues.iter().map(move |i| format!("{}: {}", r.file_path, i)))
            .take(cap)
            .collect();

        Self {
            files_analyzed: results.len(),
            total_lines,
            total_issues,
            remaining_issues: total_issues - top_issues.len(),
            top_issues,
        }
    }

    /// Markdown block that opens the diagnosis prompt; empty when nothing was analyzed
    pub fn render(&self) -> String {
        if self.files_analyzed == 0 {
            return String::new();
        }

        let mut out = String::from("\n### 📊 Static Analysis Summary\n");
        out.push_str(&format!(
            "- **Total Lines of Code**: {}\n",
            group_thousands(self.total_lines)
        ));
        out.push_str(&format!("- **Files Analyzed**: {}\n", self.files_analyzed));
        out.push_str(&format!("- **Issues Found**: {}\n\n", self.total_issues));

        if self.total_issues > 0 {
            out.push_str("**Top Issues Found:**\n");
            for issue in &self.top_issues {
                out.push_str(&format!("- {}\n", issue));
            }
            if self.remaining_issues > 0 {
                out.push_str(&format!("... and {} more issues\n", self.remaining_issues));
            }
        }

        out
    }
}

/// Render the summary for a set of results with the default issue cap
pub fn summarize(results: &[AnalysisResult]) -> String {
    AnalysisSummary::from_results(results, SUMMARY_ISSUE_CAP).render()
}
