//! Core traits for language analysis.

use std::path::Path;

use super::FileFacts;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Kept separate from extracted facts so the tree can be reused across
/// analysis passes (dependency graph, documentation checks) without
/// re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Language-specific analyzer trait.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create parsers per
/// call rather than sharing one.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "typescript", "python").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Returns an error if parsing fails completely. Partial parse errors
    /// are still returned as a valid tree with ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Extract imports and exports from a parsed file.
    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
