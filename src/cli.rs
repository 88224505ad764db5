//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::analysis::{analyze_snapshot, summarize};
use crate::backends::exec::CommandDiagnoser;
use crate::backends::fingerprint::fingerprint;
use crate::backends::scan::ScanOptions;
use crate::cache::store::ResultCache;
use crate::core::config::Config;
use crate::core::error::DoctorError;
use crate::core::paths::default_config_path;
use crate::core::render::{OutputFormat, Record, RenderConfig, Renderer};
use crate::flows::diagnose::{
    compose_prompt, print_report, run_diagnose, scan_with_summary, DiagnoseOptions,
};
use crate::flows::prompt::{check_prompt_size, SYSTEM_PROMPT};
use crate::flows::report::{write_report, ReportHeader};

/// sophidoc - snapshot a project, analyze it, and get a cached diagnosis.
#[derive(Parser, Debug)]
#[command(name = "sophidoc")]
#[command(
    author,
    version,
    about,
    long_about = r#"sophidoc reads a project tree into a bounded snapshot (built-in ignore
rules plus your own patterns, per-file and total size limits), runs lightweight
static analysis, and hands the result to a diagnosis command of your choice.

Diagnoses are cached by a fingerprint of the snapshot (paths, sizes and
modification times), so re-running on an unchanged tree is instant.

Examples:
    sophidoc diagnose ./my-app -t "Node.js API" --exec "llm -m gpt-4o"
    sophidoc diagnose . -t "Python CLI" -i docs -i "*.csv" -o report.md
    sophidoc scan . --format md
    sophidoc analyze src --summary
    sophidoc fingerprint .
"#
)]
pub struct Cli {
    /// Configuration file to use.
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        long_help = "Configuration file to use instead of the default\n\
(<config dir>/sophidoc/config.json).\n\n\
A missing file means built-in defaults; a malformed file is reported and ignored."
    )]
    pub config: Option<PathBuf>,

    /// Output format for listings (jsonl/json/md).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for scan and analyze listings.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)"
    )]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors. Setting NO_COLOR has the same effect."
    )]
    pub no_color: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug logging on stderr, including the name of every file read.\n\
RUST_LOG, when set, takes precedence."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that scans a tree
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Project directory to scan.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Ignore pattern (repeatable).
    #[arg(
        short,
        long = "ignore",
        value_name = "PATTERN",
        long_help = "A file or directory pattern to ignore, e.g. 'docs' or '*.log'.\n\
Can be given multiple times.\n\n\
Directories are matched by name; files by their path relative to PATH."
    )]
    pub ignore: Vec<String>,

    /// Maximum size of a single file in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// Maximum total size of all admitted files in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_total_size: Option<u64>,
}

impl ScanArgs {
    fn options(&self, config: &Config) -> ScanOptions {
        let mut options = ScanOptions::from_config(config, self.ignore.clone());
        if let Some(n) = self.max_file_size {
            options.max_file_size = n;
        }
        if let Some(n) = self.max_total_size {
            options.max_total_size = n;
        }
        options
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Diagnose a project (cached by snapshot fingerprint).
    #[command(
        long_about = "Scan PATH, look up a cached diagnosis for the snapshot, and otherwise run\n\
static analysis and pipe the composed prompt into the diagnosis command.\n\n\
The diagnosis command receives the prompt on stdin, the reviewer instructions in\n\
$SOPHIDOC_SYSTEM_PROMPT and the project type in $SOPHIDOC_PROJECT_TYPE. Its stdout\n\
is the report.\n\n\
Examples:\n\
  sophidoc diagnose . -t \"Rust CLI\" --exec \"llm -m gpt-4o\"\n\
  sophidoc diagnose ./api -t \"Flask API\" -o report.md -q\n"
    )]
    Diagnose {
        #[command(flatten)]
        scan: ScanArgs,

        /// Short description of the project type.
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        project_type: String,

        /// Bypass the cache for this run.
        #[arg(long)]
        no_cache: bool,

        /// Skip static analysis.
        #[arg(long)]
        no_static_analysis: bool,

        /// Save the report as Markdown.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not print the report to the terminal.
        #[arg(short, long)]
        quiet: bool,

        /// Diagnosis command line (overrides `diagnose_command` in the config).
        #[arg(long, value_name = "CMD")]
        exec: Option<String>,
    },

    /// Print the prompt that would be sent to the diagnosis command.
    #[command(
        long_about = "Compose and print the exact prompt used by `diagnose`, without running\n\
the diagnosis command or touching the cache.\n\n\
Example:\n\
  sophidoc prompt . -t \"Python CLI\" | wc -c\n"
    )]
    Prompt {
        #[command(flatten)]
        scan: ScanArgs,

        /// Short description of the project type.
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        project_type: String,

        /// Skip static analysis.
        #[arg(long)]
        no_static_analysis: bool,
    },

    /// List admitted and skipped files.
    #[command(
        long_about = "Scan PATH with the ignore rules and size limits and emit one record per\n\
admitted file, skipped file and read warning, in traversal order.\n\n\
Examples:\n\
  sophidoc scan .\n\
  sophidoc scan . -i tests --max-total-size 200000 --format md\n"
    )]
    Scan {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Print the snapshot fingerprint (the cache key).
    Fingerprint {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Run static analysis only.
    #[command(
        long_about = "Analyze every admitted file and emit per-file results (lines, size,\n\
language metrics, issues). With --summary, print the aggregate summary instead.\n\n\
Examples:\n\
  sophidoc analyze src\n\
  sophidoc analyze . --summary\n"
    )]
    Analyze {
        #[command(flatten)]
        scan: ScanArgs,

        /// Print the aggregate summary instead of per-file results.
        #[arg(long)]
        summary: bool,
    },

    /// Manage the diagnosis cache.
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },

    /// Show or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Remove every cached diagnosis.
    Clear,
    /// Print the cache directory.
    Path,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration.
    Show,
    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = Config::load(&config_path);
    tracing::debug!(path = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Diagnose {
            scan,
            project_type,
            no_cache,
            no_static_analysis,
            output,
            quiet,
            exec,
        } => {
            let mut options = DiagnoseOptions::from_config(&config, &project_type, Vec::new());
            options.scan = scan.options(&config);
            if no_static_analysis {
                options.static_analysis = false;
            }

            let cache = (config.cache_enabled && !no_cache).then(|| ResultCache::new(config.cache_dir()));
            let command = exec.or_else(|| config.diagnose_command.clone());

            let diagnosis = run_diagnose(&scan.path, &options, cache.as_ref(), || match &command {
                Some(line) => CommandDiagnoser::new(line, SYSTEM_PROMPT),
                None => Err(DoctorError::Config(format!(
                    "No diagnose command configured; pass --exec or set diagnose_command in {}",
                    config_path.display()
                ))),
            })?;
            tracing::debug!(fingerprint = %diagnosis.fingerprint, cached = diagnosis.cached, "Diagnosis ready");

            if !quiet {
                print_report(&diagnosis);
            }

            if let Some(output) = output {
                let header =
                    ReportHeader::new(&project_type, &diagnosis.root, &diagnosis.stats, diagnosis.cached);
                match write_report(&output, &header, &diagnosis.report) {
                    Ok(()) => eprintln!(
                        "{}",
                        format!("Report successfully saved to {}", output.display()).green()
                    ),
                    Err(e) => eprintln!(
                        "{}",
                        format!("Error: Could not save the report to {}: {}", output.display(), e)
                            .red()
                    ),
                }
            }
            Ok(())
        }

        Commands::Prompt {
            scan,
            project_type,
            no_static_analysis,
        } => {
            let mut options = DiagnoseOptions::from_config(&config, &project_type, Vec::new());
            options.scan = scan.options(&config);
            if no_static_analysis {
                options.static_analysis = false;
            }
            let snapshot = scan_with_summary(&scan.path, &options.scan)?;
            let prompt = compose_prompt(&snapshot, &options);
            check_prompt_size(&prompt, options.token_model, options.max_prompt_tokens);
            println!("{}", prompt);
            Ok(())
        }

        Commands::Scan { scan } => {
            let snapshot = scan_with_summary(&scan.path, &scan.options(&config))?;
            let mut records: Vec<Record> = snapshot.admitted().map(Record::File).collect();
            records.extend(snapshot.stats.skipped.iter().map(Record::Skipped));
            records.extend(snapshot.warnings.iter().map(Record::Warning));
            print_records(&records, render_config);
            Ok(())
        }

        Commands::Fingerprint { scan } => {
            let snapshot = scan_with_summary(&scan.path, &scan.options(&config))?;
            println!("{}", fingerprint(snapshot.admitted()));
            Ok(())
        }

        Commands::Analyze { scan, summary } => {
            let snapshot = scan_with_summary(&scan.path, &scan.options(&config))?;
            let results = analyze_snapshot(&snapshot);
            if summary {
                print!("{}", summarize(&results));
            } else {
                let records: Vec<Record> = results.iter().map(Record::Analysis).collect();
                print_records(&records, render_config);
            }
            Ok(())
        }

        Commands::Cache { action } => {
            let cache = ResultCache::new(config.cache_dir());
            match action {
                CacheCommands::Path => println!("{}", cache.dir().display()),
                CacheCommands::Clear => {
                    let removed = cache
                        .clear()
                        .with_context(|| format!("Failed to clear {}", cache.dir().display()))?;
                    eprintln!("Removed {} cache entries", removed);
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigCommands::Show => {
                eprintln!("Configuration file: {}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigCommands::Init { force } => init_config(&config_path, force),
        },
    }
}

fn print_records(records: &[Record<'_>], config: RenderConfig) {
    let output = Renderer::with_config(config).render(records);
    if !output.is_empty() {
        println!("{}", output);
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    Config::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Wrote default configuration to {}", path.display());
    Ok(())
}
