//! Fact structures extracted from AST analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// An import statement as written in source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    /// The raw module specifier (e.g. `./util`, `os.path`, `java.util.List`).
    pub specifier: String,
    /// Symbol names imported from the module. Empty for bare or
    /// default-only imports.
    pub names: Vec<String>,
    /// Whether the import pulls in the whole namespace
    /// (`import * as x`, `from m import *`, `import a.b.*`).
    pub is_wildcard: bool,
    /// Source span of the import statement.
    pub span: Span,
}

/// An exported symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    /// The exported name.
    pub name: String,
    /// Source span of the exporting declaration.
    pub span: Span,
}

/// Imports and exports extracted from a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFacts {
    /// Root-relative file path.
    pub path: String,
    /// Language identifier.
    pub language: String,
    /// All imports in the file.
    pub imports: Vec<Import>,
    /// All exported symbols.
    pub exports: Vec<Export>,
    /// Whether the file had parse errors.
    pub has_parse_errors: bool,
}

impl FileFacts {
    /// Create empty facts for a file.
    pub fn empty(path: &str, language: &str) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
            imports: Vec::new(),
            exports: Vec::new(),
            has_parse_errors: false,
        }
    }
}
