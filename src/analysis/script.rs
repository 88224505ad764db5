//! Textual checks for script-like sources (JavaScript/TypeScript)
//!
//! Each check is independent of the others and of their order. A presence check
//! reports once when its pattern occurs at all; a threshold check reports once
//! when the occurrence count goes over its limit.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::{PatternCount, ScriptMetrics};

enum Rule {
    Presence(&'static str),
    Threshold { limit: usize, label: &'static str },
}

struct ScriptCheck {
    name: &'static str,
    pattern: Regex,
    rule: Rule,
}

impl ScriptCheck {
    fn new(name: &'static str, pattern: &str, rule: Rule) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid script check regex"),
            rule,
        }
    }

    fn issue(&self, count: usize) -> Option<String> {
        match self.rule {
            Rule::Presence(message) if count > 0 => Some(message.to_string()),
            Rule::Threshold { limit, label } if count > limit => {
                Some(format!("{} ({}) - consider refactoring", label, count))
            }
            _ => None,
        }
    }
}

static CHECKS: Lazy<Vec<ScriptCheck>> = Lazy::new(|| {
    vec![
        ScriptCheck::new(
            "console_log",
            r"console\.log\(",
            Rule::Presence("Contains console.log statements (remove for production)"),
        ),
        ScriptCheck::new(
            "var_declaration",
            r"\bvar\s",
            Rule::Presence("Uses 'var' declarations (consider 'let' or 'const')"),
        ),
        ScriptCheck::new(
            "debugger",
            r"\bdebugger\b",
            Rule::Presence("Contains debugger statements"),
        ),
        ScriptCheck::new(
            "function_keyword",
            r"\bfunction\b",
            Rule::Threshold {
                limit: 10,
                label: "High function count",
            },
        ),
    ]
});

pub fn analyze(content: &str, issues: &mut Vec<String>) -> ScriptMetrics {
    let mut metrics = ScriptMetrics::default();
    for check in CHECKS.iter() {
        let count = check.pattern.find_iter(content).count();
        if let Some(issue) = check.issue(count) {
            issues.push(issue);
        }
        metrics.patterns.push(PatternCount {
            pattern: check.name.to_string(),
            count,
        });
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> (ScriptMetrics, Vec<String>) {
        let mut issues = Vec::new();
        let metrics = analyze(src, &mut issues);
        (metrics, issues)
    }

    fn count_of(metrics: &ScriptMetrics, name: &str) -> usize {
        metrics
            .patterns
            .iter()
            .find(|p| p.pattern == name)
            .map(|p| p.count)
            .unwrap()
    }

    #[test]
    fn test_clean_script_has_no_issues() {
        let (metrics, issues) = run("const x = 1;\nlet y = () => x;\nexport default y;\n");
        assert!(issues.is_empty());
        assert_eq!(metrics.patterns.len(), 4);
        assert!(metrics.patterns.iter().all(|p| p.count == 0));
    }

    #[test]
    fn test_presence_checks_report_once() {
        let src = "var a = 1;\nvar b = 2;\nconsole.log(a);\nconsole.log(b);\n";
        let (metrics, issues) = run(src);
        assert_eq!(
            issues,
            vec![
                "Contains console.log statements (remove for production)",
                "Uses 'var' declarations (consider 'let' or 'const')",
            ]
        );
        assert_eq!(count_of(&metrics, "console_log"), 2);
        assert_eq!(count_of(&metrics, "var_declaration"), 2);
    }

    #[test]
    fn test_var_inside_identifier_is_not_flagged() {
        let (_, issues) = run("const avar = 1;\nconst variance = 2;\n");
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_function_threshold() {
        let ten: String = (0..10).map(|i| format!("function f{}() {{}}\n", i)).collect();
        let (_, issues) = run(&ten);
        assert!(issues.is_empty());

        let eleven = format!("{}function extra() {{}}\n", ten);
        let (metrics, issues) = run(&eleven);
        assert_eq!(issues, vec!["High function count (11) - consider refactoring"]);
        assert_eq!(count_of(&metrics, "function_keyword"), 11);
    }

    #[test]
    fn test_debugger_statement() {
        let (_, issues) = run("function f() {\n  debugger;\n}\n");
        assert_eq!(issues, vec!["Contains debugger statements"]);
    }
}
