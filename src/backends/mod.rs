//! Backends module - Filesystem and external process plumbing
//!
//! Provides:
//! - filter: Built-in and caller ignore rules
//! - scan: Two-pass tree scan with size budgets
//! - fingerprint: Metadata-only snapshot hash
//! - exec: Command-based diagnosis collaborator

pub mod exec;
pub mod filter;
pub mod fingerprint;
pub mod scan;
