//! Prompt composition
//!
//! Turns a snapshot (and an optional analysis summary) into the text blob handed
//! to the diagnosis collaborator.

use crate::core::model::Snapshot;
use crate::core::tokenizer::{count_tokens, TokenModel};

/// Reviewer instructions passed to the collaborator alongside the prompt
pub const SYSTEM_PROMPT: &str = "You are an expert code reviewer and software architect, acting as a \
\"Project Doctor\". Your tone is helpful, constructive, and easy to understand. Analyze the \
following project files and structure to identify potential issues. Look for common mistakes, \
missing files, bad practices, and areas for improvement.

Provide a simple, clear, and actionable summary of your findings. Format your response in \
Markdown, ready for terminal output. Use emojis to make the categories more engaging.

Categorize your feedback into three main sections:
- ### 🚨 Critical Issues: Things that are likely broken, represent security vulnerabilities, or will cause errors.
- ### 🤔 Things You Might Be Forgetting: Suggestions for missing best practices, files, or features.
- ### ✨ Suggestions for Improvement: Ideas for refactoring, better code style, performance optimizations, or improving maintainability.

Start with a brief, one-sentence summary of the project's overall health before diving into the categories.";

/// All file sections, in scan order
pub fn file_sections(snapshot: &Snapshot) -> String {
    snapshot
        .files
        .iter()
        .map(|f| format!("--- Filename: {} ---\n{}\n", f.file.path, f.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full collaborator input
///
/// `summary` is the rendered static analysis block, or empty.
pub fn build_prompt(project_type: &str, summary: &str, snapshot: &Snapshot) -> String {
    format!(
        "Project Type: {}\n\n{}Project Files & Content:\n---\n{}",
        project_type,
        summary,
        file_sections(snapshot)
    )
}

/// Count prompt tokens, warning when over `max_tokens`
pub fn check_prompt_size(prompt: &str, model: TokenModel, max_tokens: usize) -> usize {
    let tokens = count_tokens(prompt, model);
    tracing::info!(tokens, model = %model, "Prompt size");
    if tokens > max_tokens {
        tracing::warn!(
            "Prompt is {} tokens, above the configured limit of {}; the collaborator may truncate it",
            tokens,
            max_tokens
        );
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{AdmittedFile, LoadedFile, ScanStats};
    use std::path::PathBuf;

    fn snapshot(files: &[(&str, &str)]) -> Snapshot {
        Snapshot {
            root: PathBuf::from("/project"),
            files: files
                .iter()
                .map(|(path, content)| LoadedFile {
                    file: AdmittedFile {
                        path: path.to_string(),
                        abs_path: PathBuf::from("/project").join(path),
                        size: content.len() as u64,
                        mtime_ns: 0,
                    },
                    content: content.to_string(),
                })
                .collect(),
            stats: ScanStats::default(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_file_sections_layout() {
        let snap = snapshot(&[("a.py", "print(1)"), ("b/c.txt", "x\n")]);
        assert_eq!(
            file_sections(&snap),
            "--- Filename: a.py ---\nprint(1)\n\n--- Filename: b/c.txt ---\nx\n\n"
        );
    }

    #[test]
    fn test_prompt_without_summary() {
        let snap = snapshot(&[("main.py", "pass")]);
        assert_eq!(
            build_prompt("Python CLI", "", &snap),
            "Project Type: Python CLI\n\nProject Files & Content:\n---\n--- Filename: main.py ---\npass\n"
        );
    }

    #[test]
    fn test_prompt_with_summary() {
        let snap = snapshot(&[("main.py", "pass")]);
        let prompt = build_prompt("Web", "\n### summary\n", &snap);
        assert!(prompt.starts_with("Project Type: Web\n\n\n### summary\nProject Files & Content:\n---\n"));
    }

    #[test]
    fn test_check_prompt_size_counts() {
        let tokens = check_prompt_size("abcdefgh", TokenModel::Heuristic, 1);
        assert_eq!(tokens, 2);
    }
}
