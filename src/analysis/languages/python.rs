//! Python language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{Export, FileFacts, Import, LanguageAnalyzer, ParsedFile, Span};

pub struct PythonAnalyzer {
    language: Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
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
            match node.kind() {
                "import_statement" => {
                    // import a.b, import a.b as c
                    let mut child_cursor = node.walk();
                    for child in node.named_children(&mut child_cursor) {
                        let target = match child.kind() {
                            "dotted_name" => Some(child),
                            "aliased_import" => child.child_by_field_name("name"),
                            _ => None,
                        };
                        if let Some(target) = target {
                            imports.push(Import {
                                specifier: parsed.node_text(target).to_string(),
                                names: Vec::new(),
                                is_wildcard: false,
                                span: Span::from_node(node),
                            });
                        }
                    }
                }
                "import_from_statement" => {
                    if let Some(import) = extract_from_import(parsed, node) {
                        imports.push(import);
                    }
                }
                _ => {}
            }
        }

        imports
    }

    /// Top-level definitions double as the module's exported surface.
    ///
    /// Python has no export syntax; names without a leading underscore are
    /// treated as public, matching the language convention.
    fn extract_exports(&self, parsed: &ParsedFile) -> Vec<Export> {
        let mut exports = Vec::new();

        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "function_definition" | "class_definition" => {
                    push_definition_export(parsed, node, &mut exports);
                }
                "decorated_definition" => {
                    if let Some(def) = node.child_by_field_name("definition") {
                        push_definition_export(parsed, def, &mut exports);
                    }
                }
                "expression_statement" => {
                    // CONSTANT = ... at module level
                    if let Some(assign) = node.named_child(0).filter(|n| n.kind() == "assignment") {
                        if let Some(left) = assign.child_by_field_name("left") {
                            if left.kind() == "identifier" {
                                let name = parsed.node_text(left);
                                if !name.starts_with('_') {
                                    exports.push(Export {
                                        name: name.to_string(),
                                        span: Span::from_node(node),
                                    });
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        exports
    }
}

fn push_definition_export(parsed: &ParsedFile, def: Node, exports: &mut Vec<Export>) {
    if let Some(name_node) = def.child_by_field_name("name") {
        let name = parsed.node_text(name_node);
        if !name.starts_with('_') {
            exports.push(Export {
                name: name.to_string(),
                span: Span::from_node(def),
            });
        }
    }
}

fn extract_from_import(parsed: &ParsedFile, node: Node) -> Option<Import> {
    let module = node.child_by_field_name("module_name")?;
    let specifier = parsed.node_text(module).to_string();

    let mut names = Vec::new();
    let mut is_wildcard = false;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.id() == module.id() {
            continue;
        }
        match child.kind() {
            "dotted_name" => names.push(parsed.node_text(child).to_string()),
            "aliased_import" => {
                if let Some(name) = child.child_by_field_name("name") {
                    names.push(parsed.node_text(name).to_string());
                }
            }
            "wildcard_import" => is_wildcard = true,
            _ => {}
        }
    }

    Some(Import {
        specifier,
        names,
        is_wildcard,
        span: Span::from_node(node),
    })
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Python source: {}", path.display()))?;

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

    fn parse_python(source: &str) -> (PythonAnalyzer, ParsedFile) {
        let analyzer = PythonAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("test.py"), source.as_bytes())
            .unwrap();
        (analyzer, parsed)
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
import os
import os.path as osp
from collections import OrderedDict, defaultdict
from . import sibling
from .util import helper
from legacy import *
"#;
        let (analyzer, parsed) = parse_python(source);
        let facts = analyzer.extract_facts(&parsed).unwrap();

        assert!(facts.imports.iter().any(|i| i.specifier == "os"));
        assert!(facts.imports.iter().any(|i| i.specifier == "os.path"));

        let collections = facts
            .imports
            .iter()
            .find(|i| i.specifier == "collections")
            .unwrap();
        assert_eq!(collections.names, vec!["OrderedDict", "defaultdict"]);

        let relative = facts.imports.iter().find(|i| i.specifier == ".").unwrap();
        assert_eq!(relative.names, vec!["sibling"]);

        assert!(facts.imports.iter().any(|i| i.specifier == ".util"));

        let legacy = facts.imports.iter().find(|i| i.specifier == "legacy").unwrap();
        assert!(legacy.is_wildcard);
    }

    #[test]
    fn test_top_level_definitions_are_exports() {
        let source = r#"
VERSION = "1.0"
_internal = True

def public_fn():
    pass

def _private_fn():
    pass

@decorator
def decorated_fn():
    pass

class Widget:
    def method(self):
        pass
"#;
        let (analyzer, parsed) = parse_python(source);
        let facts = analyzer.extract_facts(&parsed).unwrap();

        let names: Vec<_> = facts.exports.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"VERSION"));
        assert!(names.contains(&"public_fn"));
        assert!(names.contains(&"decorated_fn"));
        assert!(names.contains(&"Widget"));
        assert!(!names.contains(&"_private_fn"));
        assert!(!names.contains(&"_internal"));
        // Methods are not module-level exports
        assert!(!names.contains(&"method"));
    }
}
