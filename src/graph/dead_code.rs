//! Dead-code classification over a built dependency graph.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DependencyGraph;

/// A file imported by exactly one other file. A heuristic signal for human
/// review, not a deletion candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PossiblyDead {
    pub path: String,
    pub sole_importer: String,
}

/// Results of a dead-code detection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeadCodeDetectionResult {
    /// Files with no incoming edges that are not entry points, ordered.
    pub orphaned_files: Vec<String>,
    /// Per file: exported names never appearing as a resolved import target.
    pub unused_exports: BTreeMap<String, Vec<String>>,
    /// Files matching the test-naming convention.
    pub test_files: Vec<String>,
    /// Weakly used files with their sole importer.
    pub possibly_dead: Vec<PossiblyDead>,
}

impl DeadCodeDetectionResult {
    /// Whether any classification fired.
    pub fn is_empty(&self) -> bool {
        self.orphaned_files.is_empty()
            && self.unused_exports.is_empty()
            && self.possibly_dead.is_empty()
    }
}

/// Detection options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadCodeOptions {
    /// Classify test files as dead-code candidates too.
    pub include_tests: bool,
}

/// Derives a [`DeadCodeDetectionResult`] from a graph by traversal; the
/// graph itself is never mutated.
pub struct DeadCodeDetector {
    options: DeadCodeOptions,
}

impl DeadCodeDetector {
    pub fn new(options: DeadCodeOptions) -> Self {
        Self { options }
    }

    pub fn detect(&self, graph: &DependencyGraph) -> DeadCodeDetectionResult {
        let mut result = DeadCodeDetectionResult::default();

        for path in graph.nodes.keys() {
            if is_test_file(path) {
                result.test_files.push(path.clone());
            }
        }

        for path in &graph.orphans {
            if !self.options.include_tests && is_test_file(path) {
                continue;
            }
            result.orphaned_files.push(path.clone());
        }

        for (path, node) in &graph.nodes {
            if graph.orphans.contains(path) {
                continue;
            }
            // A wildcard import conservatively uses every export.
            if graph.wildcard_targets.contains(path) {
                continue;
            }
            let used = graph.resolved_uses.get(path);
            let unused: Vec<String> = node
                .exports
                .iter()
                .filter(|name| used.map_or(true, |u| !u.contains(*name)))
                .cloned()
                .collect();
            if !unused.is_empty() {
                result.unused_exports.insert(path.clone(), unused);
            }
        }

        for (path, node) in &graph.nodes {
            if node.imported_by.len() == 1 {
                let sole = node.imported_by.iter().next().cloned().unwrap_or_default();
                result.possibly_dead.push(PossiblyDead {
                    path: path.clone(),
                    sole_importer: sole,
                });
            }
        }

        result
    }
}

/// Test-file convention: name contains `.test.` or `.spec.`, starts with
/// `test_`, ends with `_test.<ext>`, or lives under a `test`, `tests`, or
/// `__tests__` directory.
pub fn is_test_file(path: &str) -> bool {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);

    if name.contains(".test.") || name.contains(".spec.") || name.starts_with("test_") {
        return true;
    }
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    if stem.ends_with("_test") {
        return true;
    }

    path.split('/')
        .any(|part| matches!(part, "test" | "tests" | "__tests__"))
}
