//! Output formatting for scan results.
//!
//! Two formats:
//! - Text: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;

use crate::runner::ScanReport;

/// Write results as pretty-printed JSON to stdout.
pub fn write_json(report: &ScanReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

/// Write results in text (human-readable) format.
pub fn write_text(report: &ScanReport, show_suppressed: bool) {
    println!();
    print!("  ");
    print!("{}", "stalecheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", report.root);
    println!();

    if !report.diagnostics.is_empty() {
        println!("  {} ({}):", "Skipped".yellow(), report.diagnostics.len());
        for diag in &report.diagnostics {
            println!("    {} {}", diag.path.blue(), diag.message.dimmed());
        }
        println!();
    }

    let dead = &report.dead_code;

    if !dead.orphaned_files.is_empty() {
        println!(
            "  {} ({}):",
            "Orphaned files".bold(),
            dead.orphaned_files.len()
        );
        for path in &dead.orphaned_files {
            println!("    {}", path.blue());
        }
        println!();
    }

    if !dead.possibly_dead.is_empty() {
        println!(
            "  {} ({}):",
            "Possibly dead".bold(),
            dead.possibly_dead.len()
        );
        for entry in &dead.possibly_dead {
            println!(
                "    {} {}",
                entry.path.blue(),
                format!("(only imported by {})", entry.sole_importer).dimmed()
            );
        }
        println!();
    }

    if !dead.unused_exports.is_empty() {
        let total: usize = dead.unused_exports.values().map(|v| v.len()).sum();
        println!("  {} ({}):", "Unused exports".bold(), total);
        for (path, names) in &dead.unused_exports {
            println!("    {} {}", path.blue(), names.join(", ").dimmed());
        }
        println!();
    }

    if !report.doc_issues.is_empty() {
        println!(
            "  {} ({}):",
            "Documentation issues".bold(),
            report.doc_issues.len()
        );
        println!();
        for issue in &report.doc_issues {
            print!("    {} ", issue.code.yellow());
            print!("{}", issue.file.blue());
            println!("{}", format!(":{}", issue.line).dimmed());
            println!("          {}", issue.message);
        }
        println!();
    }

    if !report.suppressed.is_empty() {
        println!(
            "  {} ({}):",
            "Suppressed".dimmed(),
            report.suppressed.len()
        );
        if show_suppressed {
            for sv in &report.suppressed {
                println!(
                    "    {} {}{} {}",
                    sv.issue.code.dimmed(),
                    sv.issue.file.dimmed(),
                    format!(":{}", sv.issue.line).dimmed(),
                    format!("(noqa at line {})", sv.directive.line).dimmed()
                );
            }
        } else {
            println!("    {}", "(use --show-suppressed to see details)".dimmed());
        }
        println!();
    }

    write_summary(report);
    println!();
}

fn write_summary(report: &ScanReport) {
    let dead = &report.dead_code;
    let finding_count = dead.orphaned_files.len()
        + dead.possibly_dead.len()
        + dead.unused_exports.values().map(|v| v.len()).sum::<usize>()
        + report.doc_issues.len();

    if report.has_findings() {
        print!("  {}", "✗".red());
        print!(
            " {} finding{} in {} file{}",
            finding_count,
            plural(finding_count),
            report.files_scanned,
            plural(report.files_scanned)
        );
    } else {
        print!("  {}", "✓".green());
        print!(
            " clean ({} file{} scanned)",
            report.files_scanned,
            plural(report.files_scanned)
        );
    }

    let ast = &report.stats.ast;
    println!(
        "  {}",
        format!("[ast cache: {} hits, {} misses]", ast.hits, ast.misses).dimmed()
    );
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
