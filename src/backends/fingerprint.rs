//! Snapshot fingerprint
//!
//! A SHA-1 digest over the admitted files' (path, mtime, size) tuples, sorted
//! by path bytes. File contents are never read: touching a file without editing
//! it invalidates the fingerprint, and an edit that keeps both mtime and size
//! does not. Each field is written as decimal/UTF-8 text followed by a NUL byte
//! so that adjacent fields cannot run together.

use sha1::{Digest, Sha1};

use crate::core::model::AdmittedFile;

/// Compute the fingerprint of an admitted file set
///
/// The input order does not matter.
pub fn fingerprint<'a, I>(files: I) -> String
where
    I: IntoIterator<Item = &'a AdmittedFile>,
{
    let mut sorted: Vec<&AdmittedFile> = files.into_iter().collect();
    sorted.sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));

    let mut hasher = Sha1::new();
    for file in sorted {
        hasher.update(file.path.as_bytes());
        hasher.update([0u8]);
        hasher.update(file.mtime_ns.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(file.size.to_string().as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
