//! Common utilities

use std::fs::Metadata;
use std::time::SystemTime;

/// File modification time in nanoseconds relative to the Unix epoch
///
/// Times before the epoch come out negative; a filesystem that cannot report
/// mtime yields 0.
pub fn mtime_ns(metadata: &Metadata) -> i64 {
    let modified = match metadata.modified() {
        Ok(t) => t,
        Err(_) => return 0,
    };
    match modified.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        Err(e) => i64::try_from(e.duration().as_nanos())
            .map(|n| -n)
            .unwrap_or(i64::MIN),
    }
}

/// Format a byte count as kilobytes with one decimal, e.g. "12.5KB"
pub fn format_kb(bytes: u64) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}

/// Format an integer with ',' thousands separators
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kb() {
        assert_eq!(format_kb(0), "0.0KB");
        assert_eq!(format_kb(1536), "1.5KB");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_mtime_ns_is_stable() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let first = mtime_ns(&std::fs::metadata(&file).unwrap());
        let second = mtime_ns(&std::fs::metadata(&file).unwrap());
        assert_eq!(first, second);
        assert!(first > 0);
    }
}
