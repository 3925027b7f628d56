//! TypeScript language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{Export, FileFacts, Import, LanguageAnalyzer, ParsedFile, Span};

pub struct TypeScriptAnalyzer {
    language: Language,
}

impl TypeScriptAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl Default for TypeScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for TypeScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "typescript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "mts"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            anyhow::anyhow!("failed to parse TypeScript source: {}", path.display())
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().replace('\\', "/"),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        let (imports, exports) = extract_module_facts(parsed);

        Ok(FileFacts {
            path: parsed.path.clone(),
            language: self.language_id().to_string(),
            imports,
            exports,
            has_parse_errors: parsed.tree.root_node().has_error(),
        })
    }
}

/// Walk top-level statements of an ES module and collect imports/exports.
///
/// Shared with the JavaScript analyzer: both grammars use the same node
/// kinds for module syntax.
pub(super) fn extract_module_facts(parsed: &ParsedFile) -> (Vec<Import>, Vec<Export>) {
    let mut imports = Vec::new();
    let mut exports = Vec::new();

    let root = parsed.tree.root_node();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "import_statement" => {
                if let Some(import) = extract_import(parsed, node) {
                    imports.push(import);
                }
            }
            "export_statement" => {
                extract_export(parsed, node, &mut imports, &mut exports);
            }
            _ => {}
        }
    }

    (imports, exports)
}

fn extract_import(parsed: &ParsedFile, node: Node) -> Option<Import> {
    let source_node = node.child_by_field_name("source")?;
    let specifier = strip_quotes(parsed.node_text(source_node)).to_string();

    let mut names = Vec::new();
    let mut is_wildcard = false;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "import_clause" {
            collect_import_clause(parsed, child, &mut names, &mut is_wildcard);
        }
    }

    Some(Import {
        specifier,
        names,
        is_wildcard,
        span: Span::from_node(node),
    })
}

fn collect_import_clause(
    parsed: &ParsedFile,
    clause: Node,
    names: &mut Vec<String>,
    is_wildcard: &mut bool,
) {
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            // import * as ns from "./m"
            "namespace_import" => *is_wildcard = true,
            // import { a, b as c } from "./m"
            "named_imports" => {
                let mut spec_cursor = child.walk();
                for spec in child.named_children(&mut spec_cursor) {
                    if spec.kind() == "import_specifier" {
                        if let Some(name) = spec.child_by_field_name("name") {
                            names.push(parsed.node_text(name).to_string());
                        }
                    }
                }
            }
            // Default import binds a local name, not an exported symbol.
            "identifier" => {}
            _ => {}
        }
    }
}

fn extract_export(
    parsed: &ParsedFile,
    node: Node,
    imports: &mut Vec<Import>,
    exports: &mut Vec<Export>,
) {
    let span = Span::from_node(node);

    // Re-exports also count as imports of the source module.
    let source = node
        .child_by_field_name("source")
        .map(|s| strip_quotes(parsed.node_text(s)).to_string());

    let mut reexport_names = Vec::new();
    let mut reexport_wildcard = false;

    if let Some(decl) = node.child_by_field_name("declaration") {
        for name in declaration_names(parsed, decl) {
            exports.push(Export {
                name,
                span: span.clone(),
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "export_clause" => {
                let mut spec_cursor = child.walk();
                for spec in child.named_children(&mut spec_cursor) {
                    if spec.kind() == "export_specifier" {
                        let name = spec
                            .child_by_field_name("name")
                            .map(|n| parsed.node_text(n).to_string());
                        let alias = spec
                            .child_by_field_name("alias")
                            .map(|n| parsed.node_text(n).to_string());
                        if let Some(name) = name {
                            // The outward-facing name is the alias if present.
                            exports.push(Export {
                                name: alias.clone().unwrap_or_else(|| name.clone()),
                                span: span.clone(),
                            });
                            reexport_names.push(name);
                        }
                    }
                }
            }
            // export * from "./m"
            "*" | "namespace_export" => reexport_wildcard = true,
            "default" => exports.push(Export {
                name: "default".to_string(),
                span: span.clone(),
            }),
            _ => {}
        }
    }

    if let Some(specifier) = source {
        imports.push(Import {
            specifier,
            names: reexport_names,
            is_wildcard: reexport_wildcard,
            span,
        });
    }
}

/// Names bound by an exported declaration.
fn declaration_names(parsed: &ParsedFile, decl: Node) -> Vec<String> {
    match decl.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "type_alias_declaration"
        | "enum_declaration" => decl
            .child_by_field_name("name")
            .map(|n| vec![parsed.node_text(n).to_string()])
            .unwrap_or_default(),
        "lexical_declaration" | "variable_declaration" => {
            let mut names = Vec::new();
            let mut cursor = decl.walk();
            for child in decl.named_children(&mut cursor) {
                if child.kind() == "variable_declarator" {
                    if let Some(name) = child.child_by_field_name("name") {
                        if name.kind() == "identifier" {
                            names.push(parsed.node_text(name).to_string());
                        }
                    }
                }
            }
            names
        }
        _ => Vec::new(),
    }
}

pub(super) fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ts(source: &str) -> (TypeScriptAnalyzer, ParsedFile) {
        let analyzer = TypeScriptAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("test.ts"), source.as_bytes())
            .unwrap();
        (analyzer, parsed)
    }

    #[test]
    fn test_named_imports() {
        let source = r#"
import { foo, bar as baz } from "./lib";
import * as ns from "./util";
import defaultThing from "./other";
import "./side-effect";
"#;
        let (analyzer, parsed) = parse_ts(source);
        let facts = analyzer.extract_facts(&parsed).unwrap();

        assert_eq!(facts.imports.len(), 4);

        let lib = facts.imports.iter().find(|i| i.specifier == "./lib").unwrap();
        assert_eq!(lib.names, vec!["foo", "bar"]);
        assert!(!lib.is_wildcard);

        let util = facts.imports.iter().find(|i| i.specifier == "./util").unwrap();
        assert!(util.is_wildcard);

        let other = facts.imports.iter().find(|i| i.specifier == "./other").unwrap();
        assert!(other.names.is_empty());
    }

    #[test]
    fn test_exports() {
        let source = r#"
export function foo() {}
export const bar = 1, qux = 2;
export class Widget {}
export interface Shape {}
export type Alias = string;
export enum Color { Red }
const hidden = 3;
export { hidden as visible };
export default foo;
"#;
        let (analyzer, parsed) = parse_ts(source);
        let facts = analyzer.extract_facts(&parsed).unwrap();

        let names: Vec<_> = facts.exports.iter().map(|e| e.name.as_str()).collect();
        for expected in ["foo", "bar", "qux", "Widget", "Shape", "Alias", "Color", "visible", "default"] {
            assert!(names.contains(&expected), "missing export {}", expected);
        }
    }

    #[test]
    fn test_reexport_is_also_an_import() {
        let source = r#"
export { helper } from "./helpers";
export * from "./everything";
"#;
        let (analyzer, parsed) = parse_ts(source);
        let facts = analyzer.extract_facts(&parsed).unwrap();

        let helpers = facts
            .imports
            .iter()
            .find(|i| i.specifier == "./helpers")
            .unwrap();
        assert_eq!(helpers.names, vec!["helper"]);

        let everything = facts
            .imports
            .iter()
            .find(|i| i.specifier == "./everything")
            .unwrap();
        assert!(everything.is_wildcard);

        assert!(facts.exports.iter().any(|e| e.name == "helper"));
    }
}
