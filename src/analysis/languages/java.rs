//! Java language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{Export, FileFacts, Import, LanguageAnalyzer, ParsedFile, Span};

pub struct JavaAnalyzer {
    language: Language,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn extract_imports(&self, parsed: &ParsedFile) -> Vec<Import> {
        let mut imports = Vec::new();

        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            if node.kind() != "import_declaration" {
                continue;
            }

            let mut specifier = String::new();
            let mut is_wildcard = false;

            let mut child_cursor = node.walk();
            for child in node.named_children(&mut child_cursor) {
                match child.kind() {
                    "scoped_identifier" | "identifier" => {
                        specifier = parsed.node_text(child).to_string();
                    }
                    "asterisk" => is_wildcard = true,
                    _ => {}
                }
            }

            if specifier.is_empty() {
                continue;
            }

            // For `import a.b.Class` the imported symbol is the final
            // segment; a wildcard import names the package only.
            let names = if is_wildcard {
                Vec::new()
            } else {
                specifier
                    .rsplit('.')
                    .next()
                    .map(|s| vec![s.to_string()])
                    .unwrap_or_default()
            };

            imports.push(Import {
                specifier,
                names,
                is_wildcard,
                span: Span::from_node(node),
            });
        }

        imports
    }

    /// Public top-level types are the file's exported surface.
    fn extract_exports(&self, parsed: &ParsedFile) -> Vec<Export> {
        let mut exports = Vec::new();

        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "class_declaration"
                | "interface_declaration"
                | "enum_declaration"
                | "record_declaration"
                | "annotation_type_declaration" => {
                    if !has_public_modifier(parsed, node) {
                        continue;
                    }
                    if let Some(name) = node.child_by_field_name("name") {
                        exports.push(Export {
                            name: parsed.node_text(name).to_string(),
                            span: Span::from_node(node),
                        });
                    }
                }
                _ => {}
            }
        }

        exports
    }
}

fn has_public_modifier(parsed: &ParsedFile, node: Node) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifiers" && parsed.node_text(child).contains("public") {
            return true;
        }
    }
    false
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Java source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().replace('\\', "/"),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        Ok(FileFacts {
            path: parsed.path.clone(),
            language: self.language_id().to_string(),
            imports: self.extract_imports(parsed),
            exports: self.extract_exports(parsed),
            has_parse_errors: parsed.tree.root_node().has_error(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_java(source: &str) -> (JavaAnalyzer, ParsedFile) {
        let analyzer = JavaAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("Test.java"), source.as_bytes())
            .unwrap();
        (analyzer, parsed)
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
package com.example;

import java.util.List;
import java.util.*;
import static java.lang.Math.PI;

public class Test {}
"#;
        let (analyzer, parsed) = parse_java(source);
        let facts = analyzer.extract_facts(&parsed).unwrap();

        let list = facts
            .imports
            .iter()
            .find(|i| i.specifier == "java.util.List")
            .unwrap();
        assert_eq!(list.names, vec!["List"]);

        let wildcard = facts
            .imports
            .iter()
            .find(|i| i.specifier == "java.util")
            .unwrap();
        assert!(wildcard.is_wildcard);

        assert!(facts.imports.iter().any(|i| i.specifier == "java.lang.Math.PI"));
    }

    #[test]
    fn test_public_types_are_exports() {
        let source = r#"
public class Widget {}

class PackagePrivate {}

public interface Shape {}

public enum Color { RED }
"#;
        let (analyzer, parsed) = parse_java(source);
        let facts = analyzer.extract_facts(&parsed).unwrap();

        let names: Vec<_> = facts.exports.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"Widget"));
        assert!(names.contains(&"Shape"));
        assert!(names.contains(&"Color"));
        assert!(!names.contains(&"PackagePrivate"));
    }
}
