//! Command-line interface for stalecheck.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::context::AstCache;
use crate::graph::DEFAULT_ENTRY_PATTERNS;
use crate::report;
use crate::runner::{self, ScanOptions};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Dead code and documentation drift detector.
///
/// Stalecheck builds an import graph over a source tree to find orphaned
/// files, weakly used files, and exports nothing imports, and checks doc
/// comments against the behavior the code actually has: declared and thrown
/// exceptions, yields, raises, and class attributes.
#[derive(Parser)]
#[command(name = "stalecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory for dead code and stale documentation
    Scan(ScanArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Root directory to scan
    pub path: PathBuf,

    /// Glob pattern to exclude (repeatable)
    #[arg(short, long = "exclude")]
    pub exclude: Vec<String>,

    /// Entry-point base-name pattern, replacing the defaults (repeatable)
    #[arg(long = "entry")]
    pub entry: Vec<String>,

    /// Treat test files as dead-code candidates too
    #[arg(long)]
    pub include_tests: bool,

    /// AST cache budget in bytes
    #[arg(long)]
    pub ast_budget: Option<usize>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Show suppressed documentation issues in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    if args.format != "text" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'text' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    if !abs_path.is_dir() {
        eprintln!("Error: {:?} is not a directory", args.path);
        return Ok(EXIT_ERROR);
    }

    let entry_patterns = if args.entry.is_empty() {
        DEFAULT_ENTRY_PATTERNS.iter().map(|s| s.to_string()).collect()
    } else {
        args.entry.clone()
    };

    let options = ScanOptions {
        exclude: args.exclude.clone(),
        ast_budget: args.ast_budget.unwrap_or(AstCache::DEFAULT_BUDGET),
        include_tests: args.include_tests,
        entry_patterns,
    };

    let report = runner::scan(&abs_path, &options)?;

    match args.format.as_str() {
        "json" => report::write_json(&report)?,
        _ => report::write_text(&report, args.show_suppressed),
    }

    if report.has_findings() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
