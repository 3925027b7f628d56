//! File enumeration and lazy content caching for a root directory.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::analysis::language_for_extension;
use crate::error::{Error, Result};

/// A cached file: content plus metadata, created on first read.
///
/// Records are never mutated in place; a re-read after `clear()` produces a
/// fresh record.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Root-relative path, forward-slash normalized.
    pub path: String,
    /// File content.
    pub content: Arc<str>,
    /// Content size in bytes.
    pub size: usize,
    /// Language identifier inferred from the extension, if supported.
    pub language: Option<&'static str>,
}

/// Index statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FileIndexStats {
    /// Number of indexed files.
    pub files: usize,
    /// Total bytes of cached content.
    pub content_cache_size: usize,
}

/// Indexes files under a root directory, honoring exclusion globs, and
/// lazily reads and caches content on first access.
///
/// Exclusion patterns are evaluated once at index time, not per access.
/// The only file-system side effect is a read on cache miss.
pub struct FileIndex {
    root: PathBuf,
    files: BTreeSet<String>,
    cache: RwLock<HashMap<String, FileRecord>>,
}

impl FileIndex {
    /// Enumerate files under `root`, skipping hidden directories and any
    /// path matching one of `exclude` (glob patterns on relative paths).
    pub fn new<P: AsRef<Path>>(root: P, exclude: &[String]) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let exclude_set = build_globset(exclude)?;

        let mut files = BTreeSet::new();
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                // Skip hidden directories (.git and friends)
                !(e.file_type().is_dir()
                    && e.file_name().to_string_lossy().starts_with('.')
                    && e.depth() > 0)
            })
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(&root) {
                Ok(r) => normalize(r),
                Err(_) => continue,
            };
            if exclude_set.is_match(&rel) {
                continue;
            }
            files.insert(rel);
        }

        Ok(Self {
            root,
            files,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// The root path, fixed at construction.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All indexed relative paths, sorted.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|s| s.as_str())
    }

    /// Whether the given relative path is indexed.
    pub fn contains(&self, rel_path: &str) -> bool {
        self.files.contains(rel_path)
    }

    /// Content for an indexed file, reading and caching on first access.
    ///
    /// Fails with [`Error::NotFound`] for paths that are not indexed, which
    /// covers both nonexistent files and paths outside the root.
    pub fn content(&self, rel_path: &str) -> Result<Arc<str>> {
        if !self.files.contains(rel_path) {
            return Err(Error::not_found(rel_path));
        }

        {
            let cache = self.cache.read().unwrap();
            if let Some(record) = cache.get(rel_path) {
                return Ok(Arc::clone(&record.content));
            }
        }

        let abs = self.root.join(rel_path);
        let text = fs::read_to_string(&abs).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(rel_path)
            } else {
                Error::io(rel_path, e)
            }
        })?;

        let content: Arc<str> = Arc::from(text.as_str());
        let record = FileRecord {
            path: rel_path.to_string(),
            content: Arc::clone(&content),
            size: content.len(),
            language: language_of_path(rel_path),
        };

        let mut cache = self.cache.write().unwrap();
        cache.insert(rel_path.to_string(), record);
        Ok(content)
    }

    /// Language identifier for an indexed file, inferred from its extension.
    pub fn language_of(&self, rel_path: &str) -> Option<&'static str> {
        language_of_path(rel_path)
    }

    /// Current index size and cached content volume.
    pub fn stats(&self) -> FileIndexStats {
        let cache = self.cache.read().unwrap();
        FileIndexStats {
            files: self.files.len(),
            content_cache_size: cache.values().map(|r| r.size).sum(),
        }
    }

    /// Drop all cached content. Idempotent; the file set is kept.
    pub fn clear(&self) {
        self.cache.write().unwrap().clear();
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::config(format!("invalid exclude pattern {:?}: {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::config(format!("invalid exclude patterns: {}", e)))
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn language_of_path(rel_path: &str) -> Option<&'static str> {
    let ext = Path::new(rel_path).extension()?.to_str()?;
    language_for_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.ts"), "export const a = 1;").unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/lib.ts"), "export const b = 2;").unwrap();
        fs::create_dir(temp.path().join("dist")).unwrap();
        fs::write(temp.path().join("dist/bundle.js"), "var x;").unwrap();
        temp
    }

    #[test]
    fn test_enumeration_with_exclusions() {
        let temp = make_tree();
        let index = FileIndex::new(temp.path(), &["dist/**".to_string()]).unwrap();

        let files: Vec<_> = index.files().collect();
        assert_eq!(files, vec!["index.ts", "src/lib.ts"]);
        assert!(!index.contains("dist/bundle.js"));
    }

    #[test]
    fn test_content_cached_on_first_read() {
        let temp = make_tree();
        let index = FileIndex::new(temp.path(), &[]).unwrap();

        assert_eq!(index.stats().content_cache_size, 0);
        let content = index.content("index.ts").unwrap();
        assert_eq!(&*content, "export const a = 1;");
        assert_eq!(index.stats().content_cache_size, content.len());

        // Second read comes from cache
        let again = index.content("index.ts").unwrap();
        assert_eq!(content, again);
        assert_eq!(index.stats().content_cache_size, content.len());
    }

    #[test]
    fn test_not_found_outside_index() {
        let temp = make_tree();
        let index = FileIndex::new(temp.path(), &[]).unwrap();

        assert!(matches!(
            index.content("nope.ts"),
            Err(Error::NotFound { .. })
        ));
        // Paths outside the root are never indexed
        assert!(matches!(
            index.content("../escape.ts"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp = make_tree();
        let index = FileIndex::new(temp.path(), &[]).unwrap();
        index.content("index.ts").unwrap();
        assert!(index.stats().content_cache_size > 0);

        index.clear();
        assert_eq!(index.stats().content_cache_size, 0);
        index.clear();
        assert_eq!(index.stats().content_cache_size, 0);

        // Re-read replaces the record
        index.content("index.ts").unwrap();
        assert!(index.stats().content_cache_size > 0);
    }

    #[test]
    fn test_language_inference() {
        let temp = make_tree();
        let index = FileIndex::new(temp.path(), &[]).unwrap();
        assert_eq!(index.language_of("index.ts"), Some("typescript"));
        assert_eq!(index.language_of("dist/bundle.js"), Some("javascript"));
        assert_eq!(index.language_of("README.md"), None);
    }
}
