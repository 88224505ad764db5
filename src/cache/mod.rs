//! Cache module - Diagnosis results keyed by snapshot fingerprint
//!
//! Provides:
//! - entry: the on-disk record (creation time + result)
//! - store: lookup with expiry, atomic overwrite, clearing

pub mod entry;
pub mod store;
