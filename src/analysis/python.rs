//! Python analysis via tree-sitter
//!
//! Counts function and class definitions at any nesting depth and flags
//! functions with too many positional parameters or no docstring. A file that
//! does not parse cleanly gets a single syntax error issue and no structural
//! metrics.

use tree_sitter::{Node, Parser, Tree};

use crate::analysis::{LanguageMetrics, StructureMetrics};

/// Functions with more positional parameters than this are flagged
pub const MAX_PARAMETERS: usize = 5;

/// Analyze one Python source
///
/// `Err` only when no syntax tree could be produced at all; a syntax error in
/// the source is an issue, not an error.
pub fn analyze(content: &str, issues: &mut Vec<String>) -> Result<LanguageMetrics, String> {
    let tree = parse(content)?;

    let root = tree.root_node();
    if root.has_error() {
        issues.push(syntax_error_issue(root));
        return Ok(LanguageMetrics::SizeOnly);
    }
    // The grammar still accepts Python 2 statements that no longer parse
    if let Some(issue) = legacy_statement_issue(root) {
        issues.push(issue);
        return Ok(LanguageMetrics::SizeOnly);
    }

    let source = content.as_bytes();
    let mut metrics = StructureMetrics::default();

    for node in preorder(root) {
        match node.kind() {
            "function_definition" => {
                metrics.functions += 1;
                check_function(node, source, issues);
            }
            "class_definition" => metrics.classes += 1,
            _ => {}
        }
    }

    metrics.complexity_score = metrics.functions + metrics.classes * 2;
    Ok(LanguageMetrics::Structured(metrics))
}

fn parse(content: &str) -> Result<Tree, String> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| format!("cannot load Python grammar: {}", e))?;
    parser
        .parse(content, None)
        .ok_or_else(|| "parser produced no syntax tree".to_string())
}

/// All nodes in source order
fn preorder(root: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    let mut cursor = root.walk();
    while let Some(node) = stack.pop() {
        out.push(node);
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

fn syntax_error_issue(root: Node<'_>) -> String {
    let bad = preorder(root)
        .into_iter()
        .find(|n| n.is_error() || n.is_missing());
    match bad {
        Some(node) => {
            let pos = node.start_position();
            if node.is_missing() {
                format!(
                    "Syntax error: missing '{}' (line {}, column {})",
                    node.kind(),
                    pos.row + 1,
                    pos.column + 1
                )
            } else {
                format!(
                    "Syntax error: invalid syntax (line {}, column {})",
                    pos.row + 1,
                    pos.column + 1
                )
            }
        }
        None => "Syntax error: invalid syntax".to_string(),
    }
}

fn legacy_statement_issue(root: Node<'_>) -> Option<String> {
    let node = preorder(root)
        .into_iter()
        .find(|n| matches!(n.kind(), "print_statement" | "exec_statement"))?;
    let pos = node.start_position();
    let reason = if node.kind() == "print_statement" {
        "Missing parentheses in call to 'print'"
    } else {
        "invalid syntax"
    };
    Some(format!(
        "Syntax error: {} (line {}, column {})",
        reason,
        pos.row + 1,
        pos.column + 1
    ))
}

fn check_function(node: Node<'_>, source: &[u8], issues: &mut Vec<String>) {
    let name = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .unwrap_or("<anonymous>");

    let params = node
        .child_by_field_name("parameters")
        .map(positional_parameter_count)
        .unwrap_or(0);
    if params > MAX_PARAMETERS {
        issues.push(format!(
            "Function '{}' has {} parameters (consider reducing)",
            name, params
        ));
    }

    if !has_docstring(node, source) {
        issues.push(format!("Function '{}' lacks documentation", name));
    }
}

/// Parameters that can be passed positionally or by keyword
///
/// Positional-only parameters (before `/`) and everything from `*`/`*args`
/// onwards are not counted. `self` is.
fn positional_parameter_count(parameters: Node<'_>) -> usize {
    let mut count = 0;
    let mut cursor = parameters.walk();
    for param in parameters.named_children(&mut cursor) {
        match param.kind() {
            "identifier" | "default_parameter" | "typed_default_parameter" => count += 1,
            "typed_parameter" => {
                let splat = param.named_child(0).map(|c| {
                    matches!(c.kind(), "list_splat_pattern" | "dictionary_splat_pattern")
                });
                if splat == Some(true) {
                    break;
                }
                count += 1;
            }
            "positional_separator" => count = 0,
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
            _ => {}
        }
    }
    count
}

/// Whether the first statement of the body is a non-blank plain string literal
///
/// Bytes literals and f-strings are expressions, not docstrings.
fn has_docstring(function: Node<'_>, source: &[u8]) -> bool {
    let Some(body) = function.child_by_field_name("body") else {
        return false;
    };
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");
    let Some(stmt) = first else {
        return false;
    };
    if stmt.kind() != "expression_statement" {
        return false;
    }
    let Some(expr) = stmt.named_child(0) else {
        return false;
    };
    if !matches!(expr.kind(), "string" | "concatenated_string") {
        return false;
    }

    let nodes = preorder(expr);
    let prefixed = nodes
        .iter()
        .filter(|n| n.kind() == "string_start")
        .filter_map(|n| n.utf8_text(source).ok())
        .any(|start| {
            start
                .chars()
                .take_while(|c| *c != '"' && *c != '\'')
                .any(|c| matches!(c, 'b' | 'B' | 'f' | 'F'))
        });
    if prefixed {
        return false;
    }

    nodes
        .into_iter()
        .filter(|n| n.kind() == "string_content")
        .filter_map(|n| n.utf8_text(source).ok())
        .any(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze as analyze_file, LanguageMetrics};

    fn run(src: &str) -> (LanguageMetrics, Vec<String>) {
        let mut issues = Vec::new();
        let metrics = analyze(src, &mut issues).unwrap();
        (metrics, issues)
    }

    fn structure(metrics: LanguageMetrics) -> StructureMetrics {
        match metrics {
            LanguageMetrics::Structured(m) => m,
            other => panic!("expected structured metrics, got {:?}", other),
        }
    }

    #[test]
    fn test_counts_functions_and_classes() {
        let src = r#"
class Greeter:
    """Says hello."""

    def greet(self, name):
        """Greet someone."""
        def inner():
            """Nested."""
            return name
        return inner()


def main():
    """Entry point."""
    Greeter().greet("x")
"#;
        let (metrics, issues) = run(src);
        let m = structure(metrics);
        assert_eq!(m.functions, 3);
        assert_eq!(m.classes, 1);
        assert_eq!(m.complexity_score, 5);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_flags_missing_docstring() {
        let (_, issues) = run("def undocumented():\n    return 1\n");
        assert_eq!(issues, vec!["Function 'undocumented' lacks documentation"]);
    }

    #[test]
    fn test_comment_before_docstring_is_skipped() {
        let src = "def f():\n    # note\n    \"\"\"Doc.\"\"\"\n    return 1\n";
        let (_, issues) = run(src);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_blank_docstring_counts_as_missing() {
        let (_, issues) = run("def f():\n    \"\"\"   \"\"\"\n    return 1\n");
        assert_eq!(issues, vec!["Function 'f' lacks documentation"]);
    }

    #[test]
    fn test_bytes_docstring_counts_as_missing() {
        let (_, issues) = run("def f():\n    b\"doc\"\n    return 1\n");
        assert_eq!(issues, vec!["Function 'f' lacks documentation"]);
    }

    #[test]
    fn test_fstring_docstring_counts_as_missing() {
        let src = "def f(x):\n    f\"doc {x}\"\n    return x\n\n\
                   def g():\n    \"plain \" F\"joined\"\n    return 1\n";
        let (_, issues) = run(src);
        assert_eq!(
            issues,
            vec![
                "Function 'f' lacks documentation",
                "Function 'g' lacks documentation",
            ]
        );
    }

    #[test]
    fn test_raw_and_unicode_prefixes_are_docstrings() {
        let src = "def f():\n    r\"\"\"Raw \\d.\"\"\"\n\n\
                   def g():\n    u'Text.'\n";
        let (_, issues) = run(src);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_parameter_threshold() {
        let src = "def ok(a, b, c, d, e):\n    \"\"\"Five.\"\"\"\n\n\
                   def many(a, b, c, d, e, f):\n    \"\"\"Six.\"\"\"\n";
        let (_, issues) = run(src);
        assert_eq!(
            issues,
            vec!["Function 'many' has 6 parameters (consider reducing)"]
        );
    }

    #[test]
    fn test_varargs_and_keyword_only_are_not_counted() {
        let src = "def f(a, b, c, *args, d=1, e=2, f=3, **kw):\n    \"\"\"Doc.\"\"\"\n\n\
                   def g(a, b, /, c, d, e, f: int, g: int = 0):\n    \"\"\"Doc.\"\"\"\n";
        let (_, issues) = run(src);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_typed_and_default_parameters_are_counted() {
        let src = "def f(self, a: int, d, e, b=1, c: str = ''):\n    \"\"\"Doc.\"\"\"\n";
        let (_, issues) = run(src);
        assert_eq!(
            issues,
            vec!["Function 'f' has 6 parameters (consider reducing)"]
        );
    }

    #[test]
    fn test_syntax_error_degrades_to_single_issue() {
        let (metrics, issues) = run("def broken(:\n    pass\n");
        assert_eq!(metrics, LanguageMetrics::SizeOnly);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Syntax error"), "{}", issues[0]);
    }

    #[test]
    fn test_python2_print_is_a_syntax_error() {
        let (metrics, issues) = run("def f():\n    \"\"\"Doc.\"\"\"\n    print \"hello\"\n");
        assert_eq!(metrics, LanguageMetrics::SizeOnly);
        assert_eq!(
            issues,
            vec!["Syntax error: Missing parentheses in call to 'print' (line 3, column 5)"]
        );
    }

    #[test]
    fn test_python2_exec_is_a_syntax_error() {
        let (metrics, issues) = run("exec \"x = 1\"\n");
        assert_eq!(metrics, LanguageMetrics::SizeOnly);
        assert_eq!(issues, vec!["Syntax error: invalid syntax (line 1, column 1)"]);
    }

    #[test]
    fn test_print_call_is_not_flagged() {
        let (metrics, issues) = run("print(\"hello\")\n");
        assert!(matches!(metrics, LanguageMetrics::Structured(_)));
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_fifty_line_file_with_seven_parameter_function() {
        let mut lines = vec![
            "\"\"\"Module docstring.\"\"\"".to_string(),
            String::new(),
            "def build(a, b, c, d, e, f, g):".to_string(),
            "    return a + b + c + d + e + f + g".to_string(),
            String::new(),
        ];
        let mut i = 0;
        while lines.len() < 50 {
            lines.push(format!("VALUE_{} = {}", i, i));
            i += 1;
        }
        let content = lines.join("\n") + "\n";

        let result = analyze_file("pkg/build.py", &content);
        assert_eq!(result.lines_of_code, 50);
        assert_eq!(
            result.issues,
            vec![
                "Function 'build' has 7 parameters (consider reducing)".to_string(),
                "Function 'build' lacks documentation".to_string(),
            ]
        );
        assert_eq!(structure(result.metrics).functions, 1);
    }

    #[test]
    fn test_empty_file_parses() {
        let (metrics, issues) = run("");
        assert_eq!(structure(metrics), StructureMetrics::default());
        assert!(issues.is_empty());
    }
}
