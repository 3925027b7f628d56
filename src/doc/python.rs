//! Docstring consistency checking.
//!
//! Parses Google-style docstring sections (`Attributes:`, `Raises:`,
//! `Yields:`) and diffs them against observed behavior: class attributes
//! (including `@property` methods and `self.x` assignments in `__init__`),
//! `raise` sites, and `yield` sites. Underscore-prefixed names are treated
//! as private and exempt from the undocumented checks.

use lazy_static::lazy_static;
use regex::Regex;
use tree_sitter::Node;

use crate::analysis::ParsedFile;

use super::{DocChecker, DocIssue, DocIssueKind};

lazy_static! {
    /// Matches `name: desc` or `name (type): desc` section entries.
    static ref SECTION_ENTRY: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\s*(?:\([^)]*\))?\s*:")
            .expect("section entry pattern is valid");
}

/// The parts of a Google-style docstring the checks care about.
#[derive(Debug, Default)]
struct DocSections {
    /// `Attributes:` entry names, if the section exists.
    attributes: Option<Vec<String>>,
    /// `Raises:` entry type names, if the section exists.
    raises: Option<Vec<String>>,
    has_yields: bool,
}

pub struct PythonDocChecker;

impl PythonDocChecker {
    pub fn new() -> Self {
        Self
    }

    fn check_node(&self, parsed: &ParsedFile, node: Node, issues: &mut Vec<DocIssue>) {
        match node.kind() {
            "function_definition" => self.check_function(parsed, node, issues),
            "class_definition" => self.check_class(parsed, node, issues),
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.check_node(parsed, child, issues);
        }
    }

    fn check_function(&self, parsed: &ParsedFile, node: Node, issues: &mut Vec<DocIssue>) {
        let name = match node.child_by_field_name("name") {
            Some(n) => parsed.node_text(n).to_string(),
            None => return,
        };
        let line = node.start_position().row + 1;
        let file = parsed.path.as_str();

        let doc = docstring_of(parsed, node);
        let doc = match doc {
            None => {
                if !name.starts_with('_') {
                    issues.push(DocIssue::new(
                        DocIssueKind::UndocumentedFunction,
                        format!("function {} has no docstring", name),
                        file,
                        line,
                    ));
                }
                return;
            }
            Some(doc) => doc,
        };
        let sections = parse_sections(&doc);

        if has_yield(node) && !sections.has_yields {
            issues.push(DocIssue::new(
                DocIssueKind::UndocumentedYield,
                format!("generator {} has no Yields section", name),
                file,
                line,
            ));
        }

        let documented_raises = sections.raises.unwrap_or_default();
        for raised in raised_types(parsed, node) {
            if !documented_raises.contains(&raised) {
                issues.push(DocIssue::new(
                    DocIssueKind::UndocumentedRaise,
                    format!("{} raises {} but the Raises section does not list it", name, raised),
                    file,
                    line,
                ));
            }
        }
    }

    fn check_class(&self, parsed: &ParsedFile, node: Node, issues: &mut Vec<DocIssue>) {
        let name = match node.child_by_field_name("name") {
            Some(n) => parsed.node_text(n).to_string(),
            None => return,
        };
        let line = node.start_position().row + 1;
        let file = parsed.path.as_str();

        let doc = docstring_of(parsed, node);
        let doc = match doc {
            None => {
                if !name.starts_with('_') {
                    issues.push(DocIssue::new(
                        DocIssueKind::UndocumentedClass,
                        format!("class {} has no docstring", name),
                        file,
                        line,
                    ));
                }
                return;
            }
            Some(doc) => doc,
        };

        // Attribute checks only run against an explicit Attributes section;
        // a docstring without one makes no claims to verify.
        let documented = match parse_sections(&doc).attributes {
            Some(attrs) => attrs,
            None => return,
        };
        let actual = class_attributes(parsed, node);

        for attr in &documented {
            if !actual.contains(attr) {
                issues.push(DocIssue::new(
                    DocIssueKind::StaleAttributeDoc,
                    format!("class {} documents attribute {} which does not exist", name, attr),
                    file,
                    line,
                ));
            }
        }
        for attr in &actual {
            if attr.starts_with('_') {
                continue;
            }
            if !documented.contains(attr) {
                issues.push(DocIssue::new(
                    DocIssueKind::UndocumentedAttribute,
                    format!("class {} attribute {} is missing from the Attributes section", name, attr),
                    file,
                    line,
                ));
            }
        }
    }
}

impl Default for PythonDocChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl DocChecker for PythonDocChecker {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn check(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<DocIssue>> {
        let mut issues = Vec::new();
        self.check_node(parsed, parsed.tree.root_node(), &mut issues);
        issues.sort_by_key(|i| i.line);
        Ok(issues)
    }
}

/// The docstring of a function or class: a string expression as the first
/// statement of the body.
fn docstring_of(parsed: &ParsedFile, node: Node) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(strip_string_delimiters(parsed.node_text(expr)))
}

fn strip_string_delimiters(raw: &str) -> String {
    let trimmed = raw
        .trim_start_matches(|c| matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F'));
    for delim in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = trimmed
            .strip_prefix(delim)
            .and_then(|s| s.strip_suffix(delim))
        {
            return inner.to_string();
        }
    }
    trimmed.to_string()
}

fn parse_sections(doc: &str) -> DocSections {
    let mut sections = DocSections::default();
    let mut current: Option<&str> = None;

    for line in doc.lines() {
        let trimmed = line.trim();
        match trimmed {
            "Attributes:" => {
                sections.attributes.get_or_insert_with(Vec::new);
                current = Some("attributes");
                continue;
            }
            "Raises:" => {
                sections.raises.get_or_insert_with(Vec::new);
                current = Some("raises");
                continue;
            }
            "Yields:" => {
                sections.has_yields = true;
                current = Some("yields");
                continue;
            }
            "Args:" | "Arguments:" | "Returns:" | "Examples:" | "Example:" | "Note:"
            | "Notes:" => {
                current = None;
                continue;
            }
            _ => {}
        }

        if trimmed.is_empty() {
            continue;
        }
        // Entries are indented under their header.
        if line.starts_with(|c: char| !c.is_whitespace()) {
            current = None;
            continue;
        }

        if let Some(section) = current {
            if let Some(caps) = SECTION_ENTRY.captures(trimmed) {
                let entry = simple_name(&caps[1]);
                match section {
                    "attributes" => {
                        if let Some(attrs) = sections.attributes.as_mut() {
                            attrs.push(entry);
                        }
                    }
                    "raises" => {
                        if let Some(raises) = sections.raises.as_mut() {
                            raises.push(entry);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    sections
}

/// Whether the function body contains a `yield`, ignoring nested defs.
fn has_yield(func: Node) -> bool {
    let body = match func.child_by_field_name("body") {
        Some(b) => b,
        None => return false,
    };
    contains_yield(body)
}

fn contains_yield(node: Node) -> bool {
    if node.kind() == "yield" {
        return true;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "function_definition" || child.kind() == "class_definition" {
            continue;
        }
        if contains_yield(child) {
            return true;
        }
    }
    false
}

/// Exception types raised in the function body, ignoring nested defs and
/// bare `raise` re-raises.
fn raised_types(parsed: &ParsedFile, func: Node) -> Vec<String> {
    let mut raised = Vec::new();
    if let Some(body) = func.child_by_field_name("body") {
        collect_raises(parsed, body, &mut raised);
    }
    raised
}

fn collect_raises(parsed: &ParsedFile, node: Node, raised: &mut Vec<String>) {
    if node.kind() == "raise_statement" {
        if let Some(name) = raise_type(parsed, node) {
            if !raised.contains(&name) {
                raised.push(name);
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "function_definition" || child.kind() == "class_definition" {
            continue;
        }
        collect_raises(parsed, child, raised);
    }
}

fn raise_type(parsed: &ParsedFile, raise: Node) -> Option<String> {
    let raised = raise.named_child(0)?;
    let name = match raised.kind() {
        "call" => parsed.node_text(raised.child_by_field_name("function")?),
        "identifier" | "attribute" => parsed.node_text(raised),
        _ => return None,
    };
    Some(simple_name(name))
}

/// Actual attributes of a class: class-body assignments, `self.x`
/// assignments in `__init__`, and `@property` method names.
fn class_attributes(parsed: &ParsedFile, class: Node) -> Vec<String> {
    let mut attrs = Vec::new();
    let body = match class.child_by_field_name("body") {
        Some(b) => b,
        None => return attrs,
    };

    let mut cursor = body.walk();
    for stmt in body.named_children(&mut cursor) {
        match stmt.kind() {
            "expression_statement" => {
                if let Some(assign) = stmt.named_child(0).filter(|n| n.kind() == "assignment") {
                    if let Some(name) = assignment_target_name(parsed, assign) {
                        push_unique(&mut attrs, name);
                    }
                }
            }
            "function_definition" => {
                if parsed
                    .node_text(stmt.child_by_field_name("name").unwrap_or(stmt))
                    == "__init__"
                {
                    collect_self_assignments(parsed, stmt, &mut attrs);
                }
            }
            "decorated_definition" => {
                if let Some(name) = property_name(parsed, stmt) {
                    push_unique(&mut attrs, name);
                } else if let Some(def) = stmt.child_by_field_name("definition") {
                    if def.kind() == "function_definition"
                        && parsed.node_text(def.child_by_field_name("name").unwrap_or(def))
                            == "__init__"
                    {
                        collect_self_assignments(parsed, def, &mut attrs);
                    }
                }
            }
            _ => {}
        }
    }

    attrs
}

fn assignment_target_name(parsed: &ParsedFile, assign: Node) -> Option<String> {
    let left = assign.child_by_field_name("left")?;
    if left.kind() == "identifier" {
        return Some(parsed.node_text(left).to_string());
    }
    None
}

fn collect_self_assignments(parsed: &ParsedFile, init: Node, attrs: &mut Vec<String>) {
    let body = match init.child_by_field_name("body") {
        Some(b) => b,
        None => return,
    };
    collect_self_in(parsed, body, attrs);
}

fn collect_self_in(parsed: &ParsedFile, node: Node, attrs: &mut Vec<String>) {
    if node.kind() == "assignment" {
        if let Some(left) = node.child_by_field_name("left") {
            if left.kind() == "attribute" {
                let object = left.child_by_field_name("object");
                let attribute = left.child_by_field_name("attribute");
                if let (Some(object), Some(attribute)) = (object, attribute) {
                    if parsed.node_text(object) == "self" {
                        push_unique(attrs, parsed.node_text(attribute).to_string());
                    }
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "function_definition" || child.kind() == "class_definition" {
            continue;
        }
        collect_self_in(parsed, child, attrs);
    }
}

/// The method name if a decorated definition is a `@property`.
fn property_name(parsed: &ParsedFile, decorated: Node) -> Option<String> {
    let mut is_property = false;
    let mut cursor = decorated.walk();
    for child in decorated.named_children(&mut cursor) {
        if child.kind() == "decorator" && parsed.node_text(child).trim() == "@property" {
            is_property = true;
        }
    }
    if !is_property {
        return None;
    }

    let def = decorated.child_by_field_name("definition")?;
    if def.kind() != "function_definition" {
        return None;
    }
    Some(parsed.node_text(def.child_by_field_name("name")?).to_string())
}

fn push_unique(attrs: &mut Vec<String>, name: String) {
    if !attrs.contains(&name) {
        attrs.push(name);
    }
}

fn simple_name(qualified: &str) -> String {
    qualified
        .rsplit('.')
        .next()
        .unwrap_or(qualified)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::get_analyzer;
    use std::path::Path;

    fn check_python(source: &str) -> Vec<DocIssue> {
        let analyzer = get_analyzer("py").unwrap();
        let parsed = analyzer
            .parse(Path::new("mod.py"), source.as_bytes())
            .unwrap();
        PythonDocChecker::new().check(&parsed).unwrap()
    }

    #[test]
    fn test_undocumented_public_function() {
        let source = "def visible():\n    pass\n\ndef _hidden():\n    pass\n";
        let issues = check_python(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DocIssueKind::UndocumentedFunction);
        assert!(issues[0].message.contains("visible"));
        assert_eq!(issues[0].line, 1);
    }

    #[test]
    fn test_undocumented_raise() {
        let source = r#"
def parse(text):
    """Parse the input.

    Raises:
        ValueError: if the input is empty.
    """
    if not text:
        raise ValueError("empty")
    if len(text) > 100:
        raise OverflowError("too long")
"#;
        let issues = check_python(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DocIssueKind::UndocumentedRaise);
        assert!(issues[0].message.contains("OverflowError"));
    }

    #[test]
    fn test_bare_reraise_is_ignored() {
        let source = r#"
def passthrough(fn):
    """Call fn, re-raising anything."""
    try:
        fn()
    except Exception:
        raise
"#;
        let issues = check_python(source);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_generator_without_yields_section() {
        let source = r#"
def numbers():
    """Produce numbers."""
    yield 1

def documented():
    """Produce numbers.

    Yields:
        int: the next number.
    """
    yield 2
"#;
        let issues = check_python(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DocIssueKind::UndocumentedYield);
        assert!(issues[0].message.contains("numbers"));
    }

    #[test]
    fn test_attribute_drift() {
        let source = r#"
class Config:
    """Holds settings.

    Attributes:
        timeout (int): request timeout.
        retries (int): retry count.
    """

    def __init__(self):
        self.timeout = 30
        self.verbose = False
"#;
        let issues = check_python(source);
        // `retries` is documented but absent; `verbose` exists undocumented.
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .any(|i| i.kind == DocIssueKind::StaleAttributeDoc && i.message.contains("retries")));
        assert!(issues.iter().any(
            |i| i.kind == DocIssueKind::UndocumentedAttribute && i.message.contains("verbose")
        ));
    }

    #[test]
    fn test_property_counts_as_attribute() {
        let source = r#"
class Point:
    """A 2D point.

    Attributes:
        x (float): horizontal coordinate.
    """

    def __init__(self):
        self._raw = (0.0, 0.0)

    @property
    def x(self):
        """Horizontal coordinate."""
        return self._raw[0]
"#;
        let issues = check_python(source);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_docstring_without_attributes_section_makes_no_claims() {
        let source = r#"
class Plain:
    """Just a docstring."""

    def __init__(self):
        self.anything = 1
"#;
        let issues = check_python(source);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }
}
