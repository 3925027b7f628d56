//! Stalecheck - dead code and documentation drift detector.
//!
//! Stalecheck builds an import graph over a multi-language source tree
//! (TypeScript, JavaScript, Python, Java) to find orphaned files, weakly
//! used files, and exports nothing imports, and checks doc comments against
//! the behavior the code actually has: declared and thrown exceptions,
//! yields, raises, and class attributes.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for AST-based analysis:
//!
//! - `context`: Per-run file index, AST cache, and their composition
//! - `analysis`: Language analyzers extracting import/export facts
//! - `graph`: Import-graph construction and dead-code detection
//! - `doc`: Documentation checkers with inline `noqa` suppression
//! - `runner`: Scan orchestration
//! - `report`: Output formatting (text, JSON)
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement `LanguageAnalyzer`
//! trait and register in `languages/mod.rs`; a language additionally gets
//! documentation checks by implementing `DocChecker` in `src/doc/`.

pub mod analysis;
pub mod cli;
pub mod context;
pub mod doc;
pub mod error;
pub mod graph;
pub mod report;
pub mod runner;

pub use analysis::{register_analyzers, FileFacts, LanguageAnalyzer, ParsedFile};
pub use context::{AnalysisContext, AstCache, ContextOptions, FileIndex};
pub use doc::{DocChecker, DocIssue, DocIssueKind};
pub use error::{Error, Result};
pub use graph::{
    DeadCodeDetectionResult, DeadCodeDetector, DependencyGraph, DependencyGraphBuilder,
};
pub use runner::{scan, ScanOptions, ScanReport};

/// Initialize all subsystems.
///
/// Call this once at startup. `scan` also does this on entry, so embedders
/// going through the runner need not call it.
pub fn init() {
    register_analyzers();
}
