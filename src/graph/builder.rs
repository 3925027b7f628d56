//! Directed import-graph construction over an analysis context.
//!
//! Nodes are files; an edge A→B means A imports B. Specifiers that do not
//! resolve to an indexed file (external packages) are kept on the node but
//! create no edge. Graphs are built fresh per run and never mutated after
//! construction; detection derives results by traversal.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rayon::prelude::*;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::analysis::{get_analyzer, FileFacts, Import};
use crate::context::AnalysisContext;
use crate::error::{Diagnostic, Error, Result};

/// Default base-name patterns for externally reachable files.
pub const DEFAULT_ENTRY_PATTERNS: &[&str] =
    &["index.*", "main.*", "app.*", "server.*", "cli.*", "lib.*"];

/// One node per analyzed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileNode {
    /// Root-relative path.
    pub path: String,
    /// Paths that import this file.
    pub imported_by: BTreeSet<String>,
    /// Paths this file imports.
    pub imports_from: BTreeSet<String>,
    /// Exported symbol names.
    pub exports: BTreeSet<String>,
    /// Raw module specifiers as written in source, pre-resolution.
    pub import_paths: BTreeSet<String>,
}

/// The built graph. `imported_by`/`imports_from` are mirror images: for
/// every edge A→B in A's `imports_from`, B's `imported_by` contains A.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: BTreeMap<String, FileNode>,
    /// Files treated as externally reachable regardless of incoming edges.
    pub entry_points: BTreeSet<String>,
    /// Files with no incoming edges that are not entry points.
    pub orphans: BTreeSet<String>,
    /// Per target file: export names consumed by some resolved import.
    pub resolved_uses: BTreeMap<String, BTreeSet<String>>,
    /// Files imported via a wildcard/namespace import at least once.
    pub wildcard_targets: BTreeSet<String>,
}

/// Graph construction plus the files skipped due to parse failures.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub graph: DependencyGraph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Options for graph construction.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Glob-style base-name patterns for entry points; `*` matches any run
    /// of characters excluding path separators. Case-insensitive.
    pub entry_patterns: Vec<String>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            entry_patterns: DEFAULT_ENTRY_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Builds a [`DependencyGraph`] from the files visible through a context.
pub struct DependencyGraphBuilder<'a> {
    ctx: &'a AnalysisContext,
    options: GraphOptions,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(ctx: &'a AnalysisContext) -> Self {
        Self {
            ctx,
            options: GraphOptions::default(),
        }
    }

    pub fn with_options(ctx: &'a AnalysisContext, options: GraphOptions) -> Self {
        Self { ctx, options }
    }

    /// Extract facts for every supported file and wire up the graph.
    ///
    /// A file that fails to parse is skipped entirely (it counts neither as
    /// importer nor importee) and reported as a diagnostic; the build never
    /// aborts on a single bad file.
    pub fn build(&self) -> Result<BuildOutcome> {
        let index = self.ctx.file_index()?;
        let entry_matcher = compile_entry_patterns(&self.options.entry_patterns)?;

        let paths: Vec<String> = index
            .files()
            .filter(|p| index.language_of(p).is_some())
            .map(|p| p.to_string())
            .collect();

        let extracted: Vec<(String, std::result::Result<FileFacts, String>)> = paths
            .par_iter()
            .map(|path| (path.clone(), self.extract_facts(path)))
            .collect();

        let mut diagnostics = Vec::new();
        let mut all_facts = Vec::new();
        for (path, outcome) in extracted {
            match outcome {
                Ok(facts) => all_facts.push(facts),
                Err(message) => diagnostics.push(Diagnostic::new(path, message)),
            }
        }
        // Deterministic ordering regardless of rayon scheduling
        all_facts.sort_by(|a, b| a.path.cmp(&b.path));

        let mut graph = DependencyGraph::default();
        for facts in &all_facts {
            let node = FileNode {
                path: facts.path.clone(),
                exports: facts.exports.iter().map(|e| e.name.clone()).collect(),
                import_paths: facts.imports.iter().map(|i| i.specifier.clone()).collect(),
                ..FileNode::default()
            };
            graph.nodes.insert(facts.path.clone(), node);
        }

        let indexed: BTreeSet<&str> = index.files().collect();
        for facts in &all_facts {
            for import in &facts.imports {
                for target in resolve(&indexed, &facts.path, import) {
                    // A file importing itself does not count toward its own
                    // incoming edges.
                    if target == facts.path {
                        continue;
                    }
                    if !graph.nodes.contains_key(&target) {
                        continue;
                    }
                    if let Some(importer) = graph.nodes.get_mut(&facts.path) {
                        importer.imports_from.insert(target.clone());
                    }
                    if let Some(imported) = graph.nodes.get_mut(&target) {
                        imported.imported_by.insert(facts.path.clone());
                    }

                    if import.is_wildcard {
                        graph.wildcard_targets.insert(target.clone());
                    }
                    graph
                        .resolved_uses
                        .entry(target.clone())
                        .or_default()
                        .extend(import.names.iter().cloned());
                }
            }
        }

        for (path, node) in &graph.nodes {
            let base = Path::new(path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(path);
            if entry_matcher.is_match(&base.to_lowercase()) {
                graph.entry_points.insert(path.clone());
            } else if node.imported_by.is_empty() {
                graph.orphans.insert(path.clone());
            }
        }

        Ok(BuildOutcome { graph, diagnostics })
    }

    fn extract_facts(&self, path: &str) -> std::result::Result<FileFacts, String> {
        let parsed = self.ctx.parse(path).map_err(|e| e.to_string())?;
        if parsed.tree.root_node().has_error() {
            return Err("source contains syntax errors".to_string());
        }
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let analyzer = get_analyzer(ext).ok_or_else(|| "no analyzer".to_string())?;
        analyzer.extract_facts(&parsed).map_err(|e| e.to_string())
    }
}

fn compile_entry_patterns(patterns: &[String]) -> Result<RegexSet> {
    let regexes: Vec<String> = patterns
        .iter()
        .map(|p| {
            let mut out = String::from("^");
            for c in p.to_lowercase().chars() {
                match c {
                    '*' => out.push_str("[^/]*"),
                    c => out.push_str(&regex::escape(&c.to_string())),
                }
            }
            out.push('$');
            out
        })
        .collect();
    RegexSet::new(&regexes)
        .map_err(|e| Error::config(format!("invalid entry pattern: {}", e)))
}

/// Resolve a raw specifier to indexed file paths.
///
/// Relative specifiers are joined against the importer's directory; Python
/// dotted modules additionally resolve from the root; Java scoped imports
/// resolve as package paths from the root. Anything else (external
/// packages) resolves to nothing.
fn resolve(indexed: &BTreeSet<&str>, importer: &str, import: &Import) -> Vec<String> {
    let spec = import.specifier.as_str();
    let dir = parent_dir(importer);

    if importer.ends_with(".py") {
        return resolve_python(indexed, &dir, spec, import);
    }
    if importer.ends_with(".java") {
        return resolve_java(indexed, spec, import);
    }

    // ES modules: only relative specifiers resolve within the index.
    if !spec.starts_with("./") && !spec.starts_with("../") {
        return Vec::new();
    }

    let joined = join_normalize(&dir, spec);
    let mut candidates = Vec::new();
    candidates.push(joined.clone());
    for ext in ["ts", "tsx", "mts", "js", "jsx", "mjs", "cjs"] {
        candidates.push(format!("{}.{}", joined, ext));
    }
    for ext in ["ts", "tsx", "js", "jsx", "mjs"] {
        candidates.push(format!("{}/index.{}", joined, ext));
    }

    first_match(&indexed, &candidates)
}

fn resolve_python(
    indexed: &BTreeSet<&str>,
    importer_dir: &str,
    spec: &str,
    import: &Import,
) -> Vec<String> {
    let dots = spec.chars().take_while(|&c| c == '.').count();
    let rest = &spec[dots..];

    let base = if dots > 0 {
        // One dot is the current package; each further dot walks up.
        let mut dir = importer_dir.to_string();
        for _ in 1..dots {
            dir = parent_dir(&dir);
        }
        dir
    } else {
        String::new()
    };

    let module_path = if rest.is_empty() {
        base.clone()
    } else {
        join_segments(&base, rest)
    };

    let mut resolved = Vec::new();
    if !module_path.is_empty() {
        let candidates = vec![
            format!("{}.py", module_path),
            format!("{}/__init__.py", module_path),
        ];
        resolved.extend(first_match(indexed, &candidates));
    } else if dots > 0 {
        // `from . import x` with the importer at the scan root: the current
        // package is the root itself, marked by a bare __init__.py.
        resolved.extend(first_match(indexed, &["__init__.py".to_string()]));
    }

    // `from pkg import mod` may name sibling modules rather than symbols.
    for name in &import.names {
        let prefix = join_segments(&module_path, name);
        let candidates = vec![
            format!("{}.py", prefix),
            format!("{}/__init__.py", prefix),
        ];
        resolved.extend(first_match(indexed, &candidates));
    }

    resolved
}

fn resolve_java(indexed: &BTreeSet<&str>, spec: &str, import: &Import) -> Vec<String> {
    let as_path = spec.replace('.', "/");

    if import.is_wildcard {
        // import a.b.*: edges to every file in the package directory.
        let prefix = format!("{}/", as_path);
        return indexed
            .iter()
            .filter(|f| {
                f.starts_with(&prefix)
                    && f.ends_with(".java")
                    && !f[prefix.len()..].contains('/')
            })
            .map(|f| f.to_string())
            .collect();
    }

    let candidates = vec![format!("{}.java", as_path)];
    first_match(indexed, &candidates)
}

fn first_match(indexed: &BTreeSet<&str>, candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .find(|c| indexed.contains(c.as_str()))
        .map(|c| vec![c.clone()])
        .unwrap_or_default()
}

fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

fn join_normalize(dir: &str, spec: &str) -> String {
    let mut parts: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };
    for segment in spec.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn join_segments(base: &str, dotted: &str) -> String {
    let rest = dotted.replace('.', "/");
    if base.is_empty() {
        rest
    } else {
        format!("{}/{}", base, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Span;
    use crate::context::{AnalysisContext, ContextOptions};
    use std::fs;
    use tempfile::TempDir;

    fn import(spec: &str, names: &[&str], wildcard: bool) -> Import {
        Import {
            specifier: spec.to_string(),
            names: names.iter().map(|s| s.to_string()).collect(),
            is_wildcard: wildcard,
            span: Span {
                start_byte: 0,
                end_byte: 0,
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        }
    }

    fn path_set(files: &[&'static str]) -> BTreeSet<&'static str> {
        files.iter().copied().collect()
    }

    #[test]
    fn test_relative_resolution() {
        let files = path_set(&["src/app.ts", "src/util.ts", "src/components/index.ts"]);
        let resolved = resolve(&files, "src/app.ts", &import("./util", &[], false));
        assert_eq!(resolved, vec!["src/util.ts"]);

        let resolved = resolve(&files, "src/app.ts", &import("./components", &[], false));
        assert_eq!(resolved, vec!["src/components/index.ts"]);

        // External packages create no edge
        let resolved = resolve(&files, "src/app.ts", &import("react", &[], false));
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_python_resolution() {
        let files = path_set(&["pkg/__init__.py", "pkg/util.py", "pkg/sub/mod.py", "top.py"]);

        // from . import util (names are sibling modules)
        let resolved = resolve(&files, "pkg/mod_a.py", &import(".", &["util"], false));
        assert!(resolved.contains(&"pkg/__init__.py".to_string()));
        assert!(resolved.contains(&"pkg/util.py".to_string()));

        // absolute dotted module
        let resolved = resolve(&files, "top.py", &import("pkg.sub.mod", &[], false));
        assert_eq!(resolved, vec!["pkg/sub/mod.py"]);

        // stdlib stays external
        let resolved = resolve(&files, "top.py", &import("os.path", &[], false));
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_python_resolution_at_scan_root() {
        // A package scanned as the root: `from . import helpers` in a
        // root-level module must reach its siblings, not a "/..."-prefixed
        // path that matches nothing.
        let files = path_set(&["__init__.py", "helpers.py", "runner.py"]);

        let resolved = resolve(&files, "runner.py", &import(".", &["helpers"], false));
        assert!(resolved.contains(&"__init__.py".to_string()));
        assert!(resolved.contains(&"helpers.py".to_string()));
    }

    #[test]
    fn test_java_resolution() {
        let files = path_set(&["com/example/Widget.java", "com/example/Shape.java", "Main.java"]);

        let resolved = resolve(
            &files,
            "Main.java",
            &import("com.example.Widget", &["Widget"], false),
        );
        assert_eq!(resolved, vec!["com/example/Widget.java"]);

        let resolved = resolve(&files, "Main.java", &import("com.example", &[], true));
        assert_eq!(resolved.len(), 2);
    }

    fn build_graph(files: &[(&str, &str)]) -> BuildOutcome {
        let temp = TempDir::new().unwrap();
        for (path, content) in files {
            let full = temp.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        let ctx = AnalysisContext::new(temp.path(), ContextOptions::default()).unwrap();
        DependencyGraphBuilder::new(&ctx).build().unwrap()
    }

    #[test]
    fn test_mirror_invariant_and_orphans() {
        let outcome = build_graph(&[
            ("index.ts", r#"import { foo } from "./lib";"#),
            ("lib.ts", "export const foo = 1;\nexport const bar = 2;"),
            ("stray.ts", "export const unused = 3;"),
        ]);
        let graph = outcome.graph;

        let lib = &graph.nodes["lib.ts"];
        assert!(lib.imported_by.contains("index.ts"));
        let index = &graph.nodes["index.ts"];
        assert!(index.imports_from.contains("lib.ts"));

        assert!(graph.entry_points.contains("index.ts"));
        assert!(graph.entry_points.contains("lib.ts")); // matches lib.*
        assert!(graph.orphans.contains("stray.ts"));
        assert!(!graph.orphans.contains("lib.ts"));
    }

    #[test]
    fn test_cycle_is_not_orphaned() {
        let outcome = build_graph(&[
            ("a.ts", r#"import { b } from "./b"; export const a = 1;"#),
            ("b.ts", r#"import { a } from "./a"; export const b = 2;"#),
        ]);
        let graph = outcome.graph;

        assert_eq!(graph.nodes["a.ts"].imported_by.len(), 1);
        assert_eq!(graph.nodes["b.ts"].imported_by.len(), 1);
        assert!(graph.orphans.is_empty());
        assert!(graph.entry_points.is_empty());
    }

    #[test]
    fn test_self_import_does_not_count() {
        let outcome = build_graph(&[(
            "loop.ts",
            r#"import { x } from "./loop"; export const x = 1;"#,
        )]);
        let graph = outcome.graph;
        assert!(graph.nodes["loop.ts"].imported_by.is_empty());
        assert!(graph.orphans.contains("loop.ts"));
    }

    #[test]
    fn test_parse_failure_is_skipped_not_fatal() {
        let outcome = build_graph(&[
            ("index.ts", r#"import { foo } from "./lib";"#),
            ("lib.ts", "export const foo = 1;"),
            ("broken.ts", "import { from ((("),
        ]);

        assert!(!outcome.graph.nodes.contains_key("broken.ts"));
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].path, "broken.ts");
        // The rest of the graph is intact
        assert!(outcome.graph.nodes["lib.ts"].imported_by.contains("index.ts"));
    }

    #[test]
    fn test_unresolved_specifiers_recorded() {
        let outcome = build_graph(&[("index.ts", r#"import React from "react";"#)]);
        let node = &outcome.graph.nodes["index.ts"];
        assert!(node.import_paths.contains("react"));
        assert!(node.imports_from.is_empty());
    }
}
