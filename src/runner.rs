//! Scan orchestration: one context, one graph build, one doc-check pass.

use std::path::Path;

use serde::Serialize;

use crate::analysis;
use crate::context::{AnalysisContext, ContextOptions, ContextStats};
use crate::doc::{
    checker_for_language, filter_suppressed, parse_noqa_directives, DocIssue, SuppressedDocIssue,
};
use crate::error::Diagnostic;
use crate::graph::{
    DeadCodeDetectionResult, DeadCodeDetector, DeadCodeOptions, DependencyGraphBuilder,
    GraphOptions, DEFAULT_ENTRY_PATTERNS,
};

/// Options for a full scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Glob patterns excluded from indexing.
    pub exclude: Vec<String>,
    /// Byte budget for the AST cache.
    pub ast_budget: usize,
    /// Classify test files as dead-code candidates too.
    pub include_tests: bool,
    /// Base-name patterns for entry points.
    pub entry_patterns: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            ast_budget: crate::context::AstCache::DEFAULT_BUDGET,
            include_tests: false,
            entry_patterns: DEFAULT_ENTRY_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Everything a single scan produced.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub root: String,
    pub files_scanned: usize,
    pub dead_code: DeadCodeDetectionResult,
    /// Documentation issues that survived suppression.
    pub doc_issues: Vec<DocIssue>,
    pub suppressed: Vec<SuppressedDocIssue>,
    /// Files skipped or degraded during the scan.
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ContextStats,
}

impl ScanReport {
    /// Whether the scan found anything actionable.
    pub fn has_findings(&self) -> bool {
        !self.dead_code.is_empty() || !self.doc_issues.is_empty()
    }
}

/// Run a full scan over `root`.
///
/// The context is created and disposed here; stats are captured just before
/// disposal so the report reflects the run. Individual files that fail to
/// parse are reported as diagnostics, never as a scan failure.
pub fn scan<P: AsRef<Path>>(root: P, options: &ScanOptions) -> anyhow::Result<ScanReport> {
    analysis::register_analyzers();

    let root = root.as_ref();
    let ctx = AnalysisContext::new(
        root,
        ContextOptions {
            exclude: options.exclude.clone(),
            ast_budget: options.ast_budget,
        },
    )?;

    let mut report = run_checks(&ctx, options, root)?;
    report.stats = ctx.stats();
    ctx.dispose();

    Ok(report)
}

fn run_checks(
    ctx: &AnalysisContext,
    options: &ScanOptions,
    root: &Path,
) -> anyhow::Result<ScanReport> {
    let builder = DependencyGraphBuilder::with_options(
        ctx,
        GraphOptions {
            entry_patterns: options.entry_patterns.clone(),
        },
    );
    let outcome = builder.build()?;
    let mut diagnostics = outcome.diagnostics;

    let dead_code = DeadCodeDetector::new(DeadCodeOptions {
        include_tests: options.include_tests,
    })
    .detect(&outcome.graph);

    let mut doc_issues = Vec::new();
    let mut suppressed = Vec::new();

    let index = ctx.file_index()?;
    let doc_targets: Vec<(String, &'static str)> = index
        .files()
        .filter_map(|p| index.language_of(p).map(|lang| (p.to_string(), lang)))
        .collect();

    for (path, language) in &doc_targets {
        let checker = match checker_for_language(language) {
            Some(c) => c,
            None => continue,
        };

        let parsed = match ctx.parse(path) {
            Ok(p) => p,
            Err(e) => {
                diagnostics.push(Diagnostic::new(path, e.to_string()));
                continue;
            }
        };
        // Graph construction already diagnosed syntax errors; don't
        // second-guess a broken tree here.
        if parsed.tree.root_node().has_error() {
            continue;
        }

        let issues = match checker.check(&parsed) {
            Ok(issues) => issues,
            Err(e) => {
                diagnostics.push(Diagnostic::new(path, e.to_string()));
                continue;
            }
        };
        if issues.is_empty() {
            continue;
        }

        let directives = parse_noqa_directives(&index.content(path)?);
        let (active, silenced) = filter_suppressed(issues, &directives);
        doc_issues.extend(active);
        suppressed.extend(silenced);
    }

    doc_issues.sort_by(|a, b| (&a.file, a.line, &a.code).cmp(&(&b.file, b.line, &b.code)));

    Ok(ScanReport {
        root: root.display().to_string(),
        files_scanned: doc_targets.len(),
        dead_code,
        doc_issues,
        suppressed,
        diagnostics,
        stats: ContextStats::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_reports_graph_and_doc_findings() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("index.ts"),
            "import { foo } from './lib';\nconsole.log(foo);\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("lib.ts"),
            "export const foo = 1;\nexport const bar = 2;\n",
        )
        .unwrap();
        fs::write(temp.path().join("stray.ts"), "export const x = 1;\n").unwrap();
        fs::write(temp.path().join("main.py"), "def helper():\n    pass\n").unwrap();

        let report = scan(temp.path(), &ScanOptions::default()).unwrap();

        assert_eq!(report.files_scanned, 4);
        assert_eq!(report.dead_code.orphaned_files, vec!["stray.ts"]);
        assert_eq!(report.dead_code.unused_exports["lib.ts"], vec!["bar"]);
        assert_eq!(report.doc_issues.len(), 1);
        assert_eq!(report.doc_issues[0].code, "SC101");
        assert!(report.has_findings());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_scan_applies_suppression() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("main.py"),
            "def helper():  # noqa: SC101\n    pass\n",
        )
        .unwrap();

        let report = scan(temp.path(), &ScanOptions::default()).unwrap();

        assert!(report.doc_issues.is_empty());
        assert_eq!(report.suppressed.len(), 1);
        assert_eq!(report.suppressed[0].issue.code, "SC101");
        // Suppression silences the doc issue; helper's never-imported
        // export is still a finding in its own right.
        assert_eq!(report.dead_code.unused_exports["main.py"], vec!["helper"]);
        assert!(report.has_findings());
    }

    #[test]
    fn test_scan_skips_broken_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.py"), "def ok():\n    \"\"\"Fine.\"\"\"\n").unwrap();
        fs::write(temp.path().join("broken.py"), "def (:::\n").unwrap();

        let report = scan(temp.path(), &ScanOptions::default()).unwrap();

        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.path == "broken.py"));
        assert!(report.doc_issues.is_empty());
    }
}
