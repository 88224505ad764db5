//! Path normalization utilities
//!
//! Ensures all paths are normalized to use '/' as separator and are relative to root.

use std::path::{Path, PathBuf};

/// Application directory name under the platform config/cache dirs
pub const APP_DIR: &str = "sophidoc";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
///
/// Only Windows uses a backslash as a separator. Elsewhere it is an ordinary file
/// name character and is kept.
#[cfg(windows)]
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(not(windows))]
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Extension of a file name including the leading dot, e.g. ".py"
///
/// Dotfiles without a further dot (".gitignore") have no extension.
pub fn dotted_extension(file_name: &str) -> Option<&str> {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    let rest = &file_name[stem_start..];
    rest.rfind('.').map(|idx| &file_name[stem_start + idx..])
}

/// Default config file location: `<config_dir>/sophidoc/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

/// Default cache directory: `<cache_dir>/sophidoc`
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("src/main.rs");
        assert_eq!(normalize_path(path), "src/main.rs");
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_is_kept_in_unix_file_names() {
        let root = Path::new("/project");
        let path = Path::new("/project/a\\b.txt");
        assert_eq!(make_relative(path, root), Some("a\\b.txt".to_string()));
    }

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = Path::new("/project/src/main.rs");
        assert_eq!(make_relative(path, root), Some("src/main.rs".to_string()));
    }

    #[test]
    fn test_make_relative_not_under_root() {
        let root = Path::new("/project");
        let path = Path::new("/other/file.rs");
        assert_eq!(make_relative(path, root), None);
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension("main.py"), Some(".py"));
        assert_eq!(dotted_extension("archive.tar.gz"), Some(".gz"));
        assert_eq!(dotted_extension("Makefile"), None);
        assert_eq!(dotted_extension(".gitignore"), None);
        assert_eq!(dotted_extension(".env.local"), Some(".local"));
    }

    #[test]
    fn test_default_locations_end_with_app_dir() {
        assert!(default_config_path().ends_with("sophidoc/config.json"));
        assert!(default_cache_dir().ends_with("sophidoc"));
    }
}
