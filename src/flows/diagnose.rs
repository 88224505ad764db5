//! Diagnose flow
//!
//! scan -> fingerprint -> cache lookup -> (miss) analysis + prompt -> collaborator
//! -> cache store. A cache hit never runs analysis or the collaborator.

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::analysis::{analyze_snapshot, summarize};
use crate::backends::exec::Diagnoser;
use crate::backends::fingerprint::fingerprint;
use crate::backends::scan::{ScanOptions, TreeScanner};
use crate::cache::store::ResultCache;
use crate::core::config::Config;
use crate::core::error::DoctorResult;
use crate::core::file_reader::{FileWarning, WarningCode};
use crate::core::model::{ScanStats, Snapshot};
use crate::core::tokenizer::TokenModel;
use crate::core::util::format_kb;
use crate::flows::prompt::{build_prompt, check_prompt_size};

/// Skipped files listed before collapsing into a count
const SKIPPED_PREVIEW: usize = 5;

#[derive(Debug, Clone)]
pub struct DiagnoseOptions {
    pub project_type: String,
    pub scan: ScanOptions,
    pub static_analysis: bool,
    pub cache_duration_hours: u64,
    pub max_prompt_tokens: usize,
    pub token_model: TokenModel,
}

impl DiagnoseOptions {
    pub fn from_config(config: &Config, project_type: &str, patterns: Vec<String>) -> Self {
        Self {
            project_type: project_type.to_string(),
            scan: ScanOptions::from_config(config, patterns),
            static_analysis: config.enable_static_analysis,
            cache_duration_hours: config.cache_duration_hours,
            max_prompt_tokens: config.max_prompt_tokens,
            token_model: config.token_model,
        }
    }
}

/// Outcome of a diagnose run
#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub report: String,
    /// Served from the cache
    pub cached: bool,
    pub fingerprint: String,
    pub root: PathBuf,
    pub stats: ScanStats,
}

/// Scan `root` and print the scan summary
pub fn scan_with_summary(root: &Path, options: &ScanOptions) -> DoctorResult<Snapshot> {
    let scanner = TreeScanner::new(root, options.clone())?;
    eprintln!(
        "{}",
        format!("Analyzing project at: {}", scanner.root().display()).blue()
    );
    let snapshot = scanner.scan()?;
    print_scan_summary(&snapshot.stats);
    Ok(snapshot)
}

/// Skipped files (first few) and the processed-files line, on stderr
pub fn print_scan_summary(stats: &ScanStats) {
    if !stats.skipped.is_empty() {
        eprintln!(
            "{}",
            format!("Skipped {} files due to size limits:", stats.skipped.len()).yellow()
        );
        for skipped in stats.skipped.iter().take(SKIPPED_PREVIEW) {
            eprintln!("  - {}", skipped);
        }
        if stats.skipped.len() > SKIPPED_PREVIEW {
            eprintln!("  ... and {} more", stats.skipped.len() - SKIPPED_PREVIEW);
        }
    }
    eprintln!(
        "{}",
        format!(
            "Processed {} files ({} total)",
            stats.total_files,
            format_kb(stats.total_bytes)
        )
        .green()
    );
}

/// Collaborator input for a snapshot, with the analysis summary when enabled
pub fn compose_prompt(snapshot: &Snapshot, options: &DiagnoseOptions) -> String {
    let summary = if options.static_analysis {
        summarize(&analyze_snapshot(snapshot))
    } else {
        String::new()
    };
    build_prompt(&options.project_type, &summary, snapshot)
}

/// Run the whole flow
///
/// `cache` is `None` when caching is disabled. The collaborator is only built
/// on a cache miss, so a missing collaborator configuration does not matter
/// when the answer is already cached.
pub fn run_diagnose<D, F>(
    root: &Path,
    options: &DiagnoseOptions,
    cache: Option<&ResultCache>,
    make_diagnoser: F,
) -> DoctorResult<Diagnosis>
where
    D: Diagnoser,
    F: FnOnce() -> DoctorResult<D>,
{
    let snapshot = scan_with_summary(root, &options.scan)?;
    let fp = fingerprint(snapshot.admitted());
    tracing::debug!(fingerprint = %fp, "Snapshot fingerprint");

    let diagnosis = |report: String, cached: bool| Diagnosis {
        report,
        cached,
        fingerprint: fp.clone(),
        root: snapshot.root.clone(),
        stats: snapshot.stats.clone(),
    };

    if let Some(cache) = cache {
        if let Some(report) = cache.get(&fp, options.cache_duration_hours) {
            eprintln!("{}", "📄 Using cached analysis result".green());
            return Ok(diagnosis(report, true));
        }
    }

    let prompt = compose_prompt(&snapshot, options);
    check_prompt_size(&prompt, options.token_model, options.max_prompt_tokens);

    let diagnoser = make_diagnoser()?;
    let report = diagnoser.diagnose(&options.project_type, &prompt)?;

    if let Some(cache) = cache {
        match cache.put(&fp, &report) {
            Ok(()) => tracing::debug!(fingerprint = %fp, "Diagnosis cached"),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                FileWarning::new(WarningCode::CacheIo, format!("Could not save to cache: {}", e)).log()
            }
        }
    }

    Ok(diagnosis(report, false))
}

/// Print the report between banners on stdout
pub fn print_report(diagnosis: &Diagnosis) {
    let title = if diagnosis.cached {
        "--- Diagnosis Report (Cached) ---"
    } else {
        "--- Diagnosis Report ---"
    };
    println!("{}", title.bold().green());
    println!("{}", diagnosis.report);
    println!("{}", "--- End of Report ---".bold().green());
}
