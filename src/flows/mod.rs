//! Flows module - Multi-step operations combining scan, cache and collaborator
//!
//! Provides:
//! - prompt: Compose the collaborator input from a snapshot
//! - diagnose: scan -> fingerprint -> cache -> analysis -> collaborator
//! - report: Markdown report file

pub mod diagnose;
pub mod prompt;
pub mod report;
