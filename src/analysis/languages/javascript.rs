//! JavaScript language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Parser};

use crate::analysis::{FileFacts, LanguageAnalyzer, ParsedFile};

use super::typescript::extract_module_facts;

pub struct JavaScriptAnalyzer {
    language: Language,
}

impl JavaScriptAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl Default for JavaScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            anyhow::anyhow!("failed to parse JavaScript source: {}", path.display())
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().replace('\\', "/"),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        // Same ES module syntax as TypeScript; the shared walker covers it.
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
