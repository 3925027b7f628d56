//! The per-run analysis context composing one file index and one AST cache.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{AstCache, AstCacheStats, FileIndex, FileIndexStats};
use crate::analysis::{get_analyzer, ParsedFile};
use crate::error::{Error, Result};

/// Aggregate statistics over both sub-caches.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContextStats {
    pub index: FileIndexStats,
    pub ast: AstCacheStats,
}

/// Construction options for an [`AnalysisContext`].
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Glob patterns excluded from indexing.
    pub exclude: Vec<String>,
    /// Byte budget for the AST cache.
    pub ast_budget: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            ast_budget: AstCache::DEFAULT_BUDGET,
        }
    }
}

/// Owns exactly one [`FileIndex`] and one [`AstCache`] for the duration of
/// an analysis run. Checks borrow both; they never construct their own.
///
/// `dispose()` clears both sub-caches and marks the context disposed; read
/// operations afterwards fail with [`Error::IllegalState`] rather than
/// returning stale data. `Drop` also disposes, so release happens on every
/// exit path.
pub struct AnalysisContext {
    index: FileIndex,
    asts: AstCache,
    disposed: AtomicBool,
}

impl AnalysisContext {
    /// Build a context for `root` with the given options.
    pub fn new<P: AsRef<Path>>(root: P, options: ContextOptions) -> Result<Self> {
        Ok(Self {
            index: FileIndex::new(root, &options.exclude)?,
            asts: AstCache::new(options.ast_budget)?,
            disposed: AtomicBool::new(false),
        })
    }

    fn ensure_live(&self, operation: &str) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::illegal_state(operation));
        }
        Ok(())
    }

    /// The file index, for checks that enumerate or read files.
    pub fn file_index(&self) -> Result<&FileIndex> {
        self.ensure_live("file_index")?;
        Ok(&self.index)
    }

    /// The AST cache, for checks that need parsed trees.
    pub fn ast_cache(&self) -> Result<&AstCache> {
        self.ensure_live("ast_cache")?;
        Ok(&self.asts)
    }

    /// Read and parse an indexed file through both caches.
    ///
    /// Fails with [`Error::NotFound`] for unindexed paths and
    /// [`Error::ParseFailure`] for files with no analyzer or unparseable
    /// content.
    pub fn parse(&self, rel_path: &str) -> Result<Arc<ParsedFile>> {
        self.ensure_live("parse")?;

        let content = self.index.content(rel_path)?;
        let ext = Path::new(rel_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let analyzer = get_analyzer(ext)
            .ok_or_else(|| Error::parse_failure(rel_path, "no analyzer for extension"))?;

        self.asts.get_or_parse(rel_path, &content, || {
            analyzer
                .parse(Path::new(rel_path), content.as_bytes())
                .map_err(|e| Error::parse_failure(rel_path, e.to_string()))
        })
    }

    /// Aggregate stats for observability. Usable even after disposal.
    pub fn stats(&self) -> ContextStats {
        ContextStats {
            index: self.index.stats(),
            ast: self.asts.stats(),
        }
    }

    /// Clear both sub-caches and mark the context disposed. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.index.clear();
        self.asts.clear();
    }

    /// Whether the context has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for AnalysisContext {
    fn drop(&mut self) {
        self.dispose();
    }
}
