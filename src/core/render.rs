//! Renderer module
//!
//! Renders listing records to different output formats: jsonl, json, md

use serde::Serialize;

use crate::analysis::{AnalysisResult, LanguageMetrics};
use crate::core::file_reader::FileWarning;
use crate::core::model::{AdmittedFile, SkippedFile};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// One line of listing output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record<'a> {
    File(&'a AdmittedFile),
    Skipped(&'a SkippedFile),
    Warning(&'a FileWarning),
    Analysis(&'a AnalysisResult),
}

/// Renderer for record lists
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render records to a string
    pub fn render(&self, records: &[Record<'_>]) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(records),
            OutputFormat::Json => self.render_json(records),
            OutputFormat::Markdown => self.render_markdown(records),
        }
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, records: &[Record<'_>]) -> String {
        records
            .iter()
            .filter_map(|record| {
                if self.config.pretty {
                    serde_json::to_string_pretty(record).ok()
                } else {
                    serde_json::to_string(record).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, records: &[Record<'_>]) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, records: &[Record<'_>]) -> String {
        let mut output = String::new();

        // Group by kind
        let mut files = Vec::new();
        let mut skipped = Vec::new();
        let mut warnings = Vec::new();
        let mut analyses = Vec::new();

        for record in records {
            match record {
                Record::File(f) => files.push(*f),
                Record::Skipped(s) => skipped.push(*s),
                Record::Warning(w) => warnings.push(*w),
                Record::Analysis(a) => analyses.push(*a),
            }
        }

        if !warnings.is_empty() {
            output.push_str("## Warnings\n\n");
            for w in warnings {
                match &w.path {
                    Some(path) => output.push_str(&format!(
                        "- **{}** `{}`: {}\n",
                        w.code.as_str(),
                        path,
                        w.message
                    )),
                    None => output.push_str(&format!("- **{}**: {}\n", w.code.as_str(), w.message)),
                }
            }
            output.push('\n');
        }

        if !files.is_empty() {
            output.push_str("## Files\n\n");
            for f in files {
                output.push_str(&format!("- `{}` ({} bytes)\n", f.path, f.size));
            }
            output.push('\n');
        }

        if !skipped.is_empty() {
            output.push_str("## Skipped\n\n");
            for s in skipped {
                output.push_str(&format!("- `{}` ({} bytes, {})\n", s.path, s.size, s.reason.as_str()));
            }
            output.push('\n');
        }

        if !analyses.is_empty() {
            output.push_str("## Analysis\n\n");
            for a in analyses {
                self.render_analysis_md(&mut output, a);
            }
        }

        output
    }

    fn render_analysis_md(&self, output: &mut String, result: &AnalysisResult) {
        output.push_str(&format!(
            "### `{}`\n\n- Lines: {}\n- Size: {} bytes\n",
            result.file_path, result.lines_of_code, result.size_bytes
        ));

        match &result.metrics {
            LanguageMetrics::Structured(m) => output.push_str(&format!(
                "- Functions: {}, classes: {}, complexity: {}\n",
                m.functions, m.classes, m.complexity_score
            )),
            LanguageMetrics::Script(m) => {
                let counts: Vec<String> = m
                    .patterns
                    .iter()
                    .map(|p| format!("{}={}", p.pattern, p.count))
                    .collect();
                output.push_str(&format!("- Patterns: {}\n", counts.join(", ")));
            }
            LanguageMetrics::SizeOnly => {}
        }

        if !result.issues.is_empty() {
            output.push_str("\n**Issues:**\n");
            for issue in &result.issues {
                output.push_str(&format!("- {}\n", issue));
            }
        }

        output.push('\n');
    }
}
