//! Shared, disposable analysis context.
//!
//! One [`AnalysisContext`] is constructed per run and lent by reference to
//! every check. It owns a [`FileIndex`] (paths + lazily cached content) and
//! an [`AstCache`] (parsed trees under a byte budget). Disposal clears both.

mod ast_cache;
mod context;
mod file_index;

pub use ast_cache::{AstCache, AstCacheStats};
pub use context::{AnalysisContext, ContextOptions, ContextStats};
pub use file_index::{FileIndex, FileIndexStats, FileRecord};
