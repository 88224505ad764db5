//! Path exclusion
//!
//! A fixed set of directory names and file extensions is always excluded. On top
//! of that, caller patterns with shell-style `*`, `?` and `[...]` are matched
//! against directory base names (for pruning) and against file paths relative
//! to the scan root. `*` also matches `/` in file paths, so `*.log` excludes
//! `logs/app.log` as well.
//!
//! Patterns follow shell `fnmatch` rules: `{`, `}` and `\` are plain
//! characters, and a `[` without a closing `]` matches itself.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::core::error::{DoctorError, DoctorResult};
use crate::core::paths::dotted_extension;

/// Directory names that are never descended into
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    "node_modules",
    ".vscode",
    ".idea",
    "venv",
    "env",
    "dist",
    "build",
];

/// File extensions that are never admitted
///
/// Entries that look like dotfile names (".DS_Store") also match a file with
/// exactly that name.
pub const DEFAULT_IGNORE_EXTENSIONS: &[&str] = &[
    ".pyc", ".pyo", ".o", ".so", ".dll", ".exe", ".DS_Store", ".log", ".tmp",
];

/// Decides whether a relative path is excluded from a scan
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl PathFilter {
    /// Compile the caller's ignore patterns
    pub fn new(patterns: &[String]) -> DoctorResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            // A pattern with an empty character class can never match
            let Some(translated) = fnmatch_to_glob(pattern) else {
                continue;
            };
            let glob = GlobBuilder::new(&translated)
                .literal_separator(false)
                .backslash_escape(false)
                .build()
                .map_err(|e| DoctorError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| DoctorError::InvalidPattern {
            pattern: patterns.join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `relative_path` ('/'-separated, relative to the scan root) is excluded
    pub fn excluded(&self, relative_path: &str, is_dir: bool) -> bool {
        let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        if is_dir {
            self.dir_excluded(name)
        } else {
            self.file_excluded(relative_path, name)
        }
    }

    fn dir_excluded(&self, name: &str) -> bool {
        DEFAULT_IGNORE_DIRS.contains(&name) || self.set.is_match(name)
    }

    fn file_excluded(&self, relative_path: &str, name: &str) -> bool {
        let static_hit = dotted_extension(name)
            .map(|ext| DEFAULT_IGNORE_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
            || DEFAULT_IGNORE_EXTENSIONS.contains(&name);
        static_hit || self.set.is_match(relative_path)
    }
}

/// Rewrite an `fnmatch` pattern into globset syntax
///
/// Returns `None` when the pattern contains a class that matches nothing
/// (every range reversed), since such a pattern never matches any path.
fn fnmatch_to_glob(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                out.push('*');
            }
            '?' => out.push('?'),
            '{' | '}' | '\\' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            '[' => {
                let mut j = i;
                if chars.get(j) == Some(&'!') {
                    j += 1;
                }
                if chars.get(j) == Some(&']') {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("[[]");
                } else {
                    out.push_str(&class_to_glob(&chars[i..j])?);
                    i = j + 1;
                }
            }
            c => out.push(c),
        }
    }
    Some(out)
}

/// Rewrite the body of an `fnmatch` class (between `[` and `]`)
fn class_to_glob(body: &[char]) -> Option<String> {
    let (negated, body) = match body.split_first() {
        Some((&'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut ranges = Vec::new();
    let mut k = 0;
    while k < body.len() {
        if k + 2 < body.len() && body[k + 1] == '-' {
            // Reversed ranges match nothing
            if body[k] <= body[k + 2] {
                ranges.push((body[k], body[k + 2]));
            }
            k += 3;
        } else {
            ranges.push((body[k], body[k]));
            k += 1;
        }
    }

    // Split characters that globset treats specially inside a class into
    // singletons, so they can be placed where they read literally
    let mut singles = Vec::new();
    let mut plain = Vec::new();
    for (mut lo, mut hi) in ranges {
        while lo <= hi && is_class_special(lo) {
            singles.push(lo);
            lo = next_char(lo);
        }
        while lo < hi && is_class_special(hi) {
            singles.push(hi);
            hi = prev_char(hi);
        }
        if lo <= hi {
            plain.push((lo, hi));
        }
    }
    singles.sort_unstable();
    singles.dedup();

    if plain.is_empty() && singles.is_empty() {
        return if negated { Some("?".to_string()) } else { None };
    }

    let mut items = String::new();
    if singles.contains(&']') {
        items.push(']');
    }
    for (lo, hi) in &plain {
        items.push(*lo);
        if lo != hi {
            items.push('-');
            items.push(*hi);
        }
    }
    for c in singles.iter().filter(|c| **c == '!' || **c == '^') {
        items.push(*c);
    }
    if singles.contains(&'-') {
        items.push('-');
    }

    let leading_negation = !negated && (items.starts_with('!') || items.starts_with('^'));
    if leading_negation {
        // Only '!', '^' and '-' are left; spell them as alternatives
        if items.chars().count() == 1 {
            return Some(items);
        }
        let alternatives: Vec<String> = items.chars().map(String::from).collect();
        return Some(format!("{{{}}}", alternatives.join(",")));
    }

    Some(format!("[{}{}]", if negated { "!" } else { "" }, items))
}

fn is_class_special(c: char) -> bool {
    matches!(c, ']' | '-' | '!' | '^')
}

fn next_char(c: char) -> char {
    char::from_u32(c as u32 + 1).unwrap_or(c)
}

fn prev_char(c: char) -> char {
    char::from_u32(c as u32 - 1).unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> PathFilter {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        PathFilter::new(&owned).unwrap()
    }

    #[test]
    fn test_static_dirs_are_excluded() {
        let f = PathFilter::new(&[]).unwrap();
        assert!(f.excluded(".git", true));
        assert!(f.excluded("web/node_modules", true));
        assert!(!f.excluded("src", true));
    }

    #[test]
    fn test_static_extensions_are_excluded() {
        let f = PathFilter::new(&[]).unwrap();
        assert!(f.excluded("pkg/mod.pyc", false));
        assert!(f.excluded("debug.log", false));
        assert!(f.excluded("a/b/.DS_Store", false));
        assert!(!f.excluded("main.py", false));
        assert!(!f.excluded("Makefile", false));
    }

    #[test]
    fn test_dir_patterns_match_base_name() {
        let f = filter(&["docs", "test*"]);
        assert!(f.excluded("docs", true));
        assert!(f.excluded("a/b/docs", true));
        assert!(f.excluded("src/tests", true));
        assert!(!f.excluded("documentation", true));
    }

    #[test]
    fn test_file_patterns_match_relative_path() {
        let f = filter(&["*.md", "src/gen_?.py", "data/[ab].csv"]);
        assert!(f.excluded("README.md", false));
        assert!(f.excluded("docs/guide/intro.md", false));
        assert!(f.excluded("src/gen_1.py", false));
        assert!(!f.excluded("src/gen_10.py", false));
        assert!(f.excluded("data/a.csv", false));
        assert!(!f.excluded("data/c.csv", false));
    }

    #[test]
    fn test_file_pattern_is_anchored_to_full_path() {
        let f = filter(&["main.py"]);
        assert!(f.excluded("main.py", false));
        assert!(!f.excluded("src/main.py", false));
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        let f = filter(&["[abc"]);
        assert!(f.excluded("[abc", false));
        assert!(!f.excluded("a", false));
    }

    #[test]
    fn test_unbalanced_brace_is_literal() {
        let f = filter(&["build{1"]);
        assert!(f.excluded("build{1", true));
        assert!(f.excluded("build{1", false));
        assert!(!f.excluded("build1", false));
    }

    #[test]
    fn test_braces_are_not_alternation() {
        let f = filter(&["{a,b}.txt"]);
        assert!(f.excluded("{a,b}.txt", false));
        assert!(!f.excluded("a.txt", false));
        assert!(!f.excluded("b.txt", false));
    }

    #[test]
    fn test_backslash_is_literal() {
        let f = filter(&[r"a\*"]);
        assert!(f.excluded(r"a\b", false));
        assert!(!f.excluded("a*", false));
        assert!(!f.excluded("ab", false));
    }

    #[test]
    fn test_class_edge_cases() {
        let f = filter(&["[]x].md", "[!a-c].txt", "[^].py", "[z-a].rs"]);
        assert!(f.excluded("].md", false));
        assert!(f.excluded("x.md", false));
        assert!(f.excluded("d.txt", false));
        assert!(!f.excluded("b.txt", false));
        assert!(f.excluded("^.py", false));
        assert!(!f.excluded("a.py", false));
        assert!(!f.excluded("z.rs", false));
    }

    #[test]
    fn test_class_with_dash_and_caret() {
        let f = filter(&["[-^]", "[a-]"]);
        assert!(f.excluded("-", false));
        assert!(f.excluded("^", false));
        assert!(f.excluded("a", false));
        assert!(!f.excluded("b", false));
    }

    #[test]
    fn test_range_ending_in_class_syntax() {
        let f = filter(&["[A-^]"]);
        assert!(f.excluded("B", false));
        assert!(f.excluded("]", false));
        assert!(f.excluded("^", false));
        assert!(!f.excluded("a", false));
    }

    #[test]
    fn test_no_user_pattern_is_rejected() {
        for pattern in ["[", "{", "}", "\\", "[]", "[!]", "a**b", "[z-a]"] {
            assert!(PathFilter::new(&[pattern.to_string()]).is_ok(), "{}", pattern);
        }
    }
}
