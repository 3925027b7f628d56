//! Bounded cache of parsed syntax trees.
//!
//! Entries are keyed by file path with a content hash, so a content change
//! invalidates the prior entry. Total retained bytes never exceed the
//! configured budget; eviction is strict LRU with ties broken by insertion
//! order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::ParsedFile;
use crate::error::{Error, Result};

/// Cache statistics. Hit/miss counters are monotonic for the lifetime of
/// the cache; `clear()` does not reset them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AstCacheStats {
    pub entries: usize,
    pub total_bytes: usize,
    pub hits: u64,
    pub misses: u64,
}

struct AstEntry {
    parsed: Arc<ParsedFile>,
    content_hash: [u8; 32],
    /// Retained size. The source buffer dominates tree memory, so it serves
    /// as the accounting unit.
    bytes: usize,
}

struct Inner {
    entries: LruCache<String, AstEntry>,
    total_bytes: usize,
}

/// LRU cache of parsed trees bounded by a byte budget.
///
/// The insert/evict path is serialized behind a mutex so concurrent misses
/// never double-parse the same file or corrupt the LRU ordering.
pub struct AstCache {
    inner: Mutex<Inner>,
    budget: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AstCache {
    /// Default byte budget: 64 MiB.
    pub const DEFAULT_BUDGET: usize = 64 * 1024 * 1024;

    /// Create a cache with the given byte budget.
    ///
    /// Fails with [`Error::ConfigError`] for a zero budget.
    pub fn new(budget: usize) -> Result<Self> {
        if budget == 0 {
            return Err(Error::config("ast cache budget must be positive"));
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                total_bytes: 0,
            }),
            budget,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// The configured byte budget.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Return the cached tree for `path` if its content is unchanged,
    /// otherwise parse via `parse_fn`, cache the result, and evict
    /// least-recently-used entries until the budget invariant holds.
    pub fn get_or_parse<F>(&self, path: &str, content: &str, parse_fn: F) -> Result<Arc<ParsedFile>>
    where
        F: FnOnce() -> Result<ParsedFile>,
    {
        let content_hash = hash_content(content);

        let mut inner = self.inner.lock().unwrap();

        if let Some(entry) = inner.entries.get(path) {
            if entry.content_hash == content_hash {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(&entry.parsed));
            }
            // Content changed: drop the stale entry before re-parsing.
            if let Some(stale) = inner.entries.pop(path) {
                inner.total_bytes -= stale.bytes;
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);

        // Parse inside the lock: serializing population means two
        // concurrent misses on the same key cannot double-parse.
        let parsed = Arc::new(parse_fn()?);
        let bytes = parsed.source.len();

        inner.entries.push(
            path.to_string(),
            AstEntry {
                parsed: Arc::clone(&parsed),
                content_hash,
                bytes,
            },
        );
        inner.total_bytes += bytes;

        while inner.total_bytes > self.budget {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => inner.total_bytes -= evicted.bytes,
                None => break,
            }
        }

        Ok(parsed)
    }

    /// Current entry count, retained bytes, and lifetime hit/miss counters.
    pub fn stats(&self) -> AstCacheStats {
        let inner = self.inner.lock().unwrap();
        AstCacheStats {
            entries: inner.entries.len(),
            total_bytes: inner.total_bytes,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop all entries and reset the byte total.
    ///
    /// Hit/miss counters persist across `clear()` as historical totals;
    /// they reset only when the cache itself is dropped.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.total_bytes = 0;
    }
}

fn hash_content(content: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::get_analyzer;
    use std::path::Path;

    fn parse_ts(path: &str, source: &str) -> ParsedFile {
        let analyzer = get_analyzer("ts").unwrap();
        analyzer.parse(Path::new(path), source.as_bytes()).unwrap()
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(matches!(AstCache::new(0), Err(Error::ConfigError { .. })));
    }

    #[test]
    fn test_hit_and_miss_accounting() {
        let cache = AstCache::new(AstCache::DEFAULT_BUDGET).unwrap();
        let src = "export const a = 1;";

        cache
            .get_or_parse("a.ts", src, || Ok(parse_ts("a.ts", src)))
            .unwrap();
        cache
            .get_or_parse("a.ts", src, || Ok(parse_ts("a.ts", src)))
            .unwrap();

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_content_change_invalidates() {
        let cache = AstCache::new(AstCache::DEFAULT_BUDGET).unwrap();

        let v1 = "export const a = 1;";
        let v2 = "export const a = 2;";
        cache
            .get_or_parse("a.ts", v1, || Ok(parse_ts("a.ts", v1)))
            .unwrap();
        cache
            .get_or_parse("a.ts", v2, || Ok(parse_ts("a.ts", v2)))
            .unwrap();

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.total_bytes, v2.len());
    }

    #[test]
    fn test_lru_eviction_respects_budget() {
        // Budget fits two of the three sources, so the least recently used
        // entry must go.
        let a = "export const aaaa = 1;"; // 22 bytes
        let b = "export const bbbb = 2;";
        let c = "export const cccc = 3;";
        let cache = AstCache::new(a.len() + b.len()).unwrap();

        cache
            .get_or_parse("a.ts", a, || Ok(parse_ts("a.ts", a)))
            .unwrap();
        cache
            .get_or_parse("b.ts", b, || Ok(parse_ts("b.ts", b)))
            .unwrap();
        // Touch a so b becomes least recently used.
        cache
            .get_or_parse("a.ts", a, || Ok(parse_ts("a.ts", a)))
            .unwrap();
        cache
            .get_or_parse("c.ts", c, || Ok(parse_ts("c.ts", c)))
            .unwrap();

        let stats = cache.stats();
        assert!(stats.total_bytes <= cache.budget());
        assert_eq!(stats.entries, 2);

        // b was evicted: asking for it again is a miss.
        let before = cache.stats().misses;
        cache
            .get_or_parse("b.ts", b, || Ok(parse_ts("b.ts", b)))
            .unwrap();
        assert_eq!(cache.stats().misses, before + 1);
    }

    #[test]
    fn test_counters_persist_across_clear() {
        let cache = AstCache::new(AstCache::DEFAULT_BUDGET).unwrap();
        let src = "export const a = 1;";
        cache
            .get_or_parse("a.ts", src, || Ok(parse_ts("a.ts", src)))
            .unwrap();

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_bytes, 0);
        assert_eq!(stats.misses, 1);
    }
}
