//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Snapshot model (admitted/skipped files, scan stats)
//! - Error taxonomy and configuration
//! - Rendering functions for different output formats
//! - Path normalization utilities
//! - File reading strategies
//! - Token counting for prompt budgeting

pub mod config;
pub mod error;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod util;
