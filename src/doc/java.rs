//! Javadoc consistency checking.
//!
//! Validates `@throws`/`@exception` tags against the method signature's
//! throws clause and observed `throw` sites, and reports undocumented
//! public members. `{@inheritDoc}` waives the requirements for inherited
//! members.

use lazy_static::lazy_static;
use regex::Regex;
use tree_sitter::Node;

use crate::analysis::ParsedFile;

use super::{DocChecker, DocIssue, DocIssueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    Method,
    Constructor,
    Class,
    Interface,
    Enum,
}

impl MemberKind {
    fn is_callable(&self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Constructor)
    }

    fn describe(&self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Class => "class",
            MemberKind::Interface => "interface",
            MemberKind::Enum => "enum",
        }
    }
}

/// Everything needed to diff a member's documentation against its behavior.
#[derive(Debug)]
struct MemberDocInfo {
    name: String,
    kind: MemberKind,
    line: usize,
    visibility: Visibility,
    doc: Option<String>,
    /// Exception types on the signature's throws clause (simple names).
    declared_throws: Vec<String>,
    /// Exception types of `throw new X(...)` sites in the body.
    observed_throws: Vec<String>,
    /// Types named by `@throws`/`@exception` tags.
    documented_throws: Vec<String>,
    has_inherit_doc: bool,
}

lazy_static! {
    static ref THROWS_TAG: Regex =
        Regex::new(r"@(?:throws|exception)\s+([A-Za-z_][A-Za-z0-9_.]*)")
            .expect("throws tag pattern is valid");
}

pub struct JavaDocChecker;

impl JavaDocChecker {
    pub fn new() -> Self {
        Self
    }

    fn extract_members(&self, parsed: &ParsedFile) -> Vec<MemberDocInfo> {
        let mut members = Vec::new();
        collect_members(parsed, parsed.tree.root_node(), &mut members);
        members.sort_by_key(|m| m.line);
        members
    }

    fn check_member(&self, parsed: &ParsedFile, member: &MemberDocInfo) -> Vec<DocIssue> {
        let mut issues = Vec::new();
        let file = parsed.path.as_str();

        if member.doc.is_none() {
            if matches!(member.visibility, Visibility::Public | Visibility::Protected) {
                let kind = if member.kind.is_callable() {
                    DocIssueKind::UndocumentedFunction
                } else {
                    DocIssueKind::UndocumentedClass
                };
                issues.push(DocIssue::new(
                    kind,
                    format!("{} {} has no documentation", member.kind.describe(), member.name),
                    file,
                    member.line,
                ));
            }
            return issues;
        }

        if member.has_inherit_doc {
            return issues;
        }

        if member.kind.is_callable() {
            let mut actual: Vec<&String> = member.declared_throws.iter().collect();
            for t in &member.observed_throws {
                if !member.declared_throws.contains(t) {
                    actual.push(t);
                }
            }

            for thrown in &actual {
                if !member.documented_throws.contains(thrown) {
                    issues.push(DocIssue::new(
                        DocIssueKind::MissingThrowsDoc,
                        format!("{} throws {} but has no @throws tag for it", member.name, thrown),
                        file,
                        member.line,
                    ));
                }
            }

            for documented in &member.documented_throws {
                if !actual.iter().any(|t| *t == documented) {
                    issues.push(DocIssue::new(
                        DocIssueKind::StaleThrowsDoc,
                        format!(
                            "{} documents @throws {} which is neither declared nor thrown",
                            member.name, documented
                        ),
                        file,
                        member.line,
                    ));
                }
            }
        }

        issues
    }
}

impl Default for JavaDocChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl DocChecker for JavaDocChecker {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn check(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<DocIssue>> {
        let mut issues = Vec::new();
        for member in self.extract_members(parsed) {
            issues.extend(self.check_member(parsed, &member));
        }
        Ok(issues)
    }
}

fn collect_members(parsed: &ParsedFile, node: Node, members: &mut Vec<MemberDocInfo>) {
    let kind = match node.kind() {
        "method_declaration" => Some(MemberKind::Method),
        "constructor_declaration" => Some(MemberKind::Constructor),
        "class_declaration" => Some(MemberKind::Class),
        "interface_declaration" => Some(MemberKind::Interface),
        "enum_declaration" => Some(MemberKind::Enum),
        _ => None,
    };

    if let Some(kind) = kind {
        if let Some(member) = extract_member(parsed, node, kind) {
            members.push(member);
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_members(parsed, child, members);
    }
}

fn extract_member(parsed: &ParsedFile, node: Node, kind: MemberKind) -> Option<MemberDocInfo> {
    let name = parsed
        .node_text(node.child_by_field_name("name")?)
        .to_string();

    let doc = javadoc_for(parsed, node);
    let documented_throws = doc
        .as_deref()
        .map(|d| {
            THROWS_TAG
                .captures_iter(d)
                .map(|c| simple_name(&c[1]))
                .collect()
        })
        .unwrap_or_default();
    let has_inherit_doc = doc
        .as_deref()
        .map(|d| d.contains("@inheritDoc"))
        .unwrap_or(false);

    Some(MemberDocInfo {
        line: node.start_position().row + 1,
        visibility: visibility_of(parsed, node),
        declared_throws: declared_throws(parsed, node),
        observed_throws: observed_throws(parsed, node),
        documented_throws,
        has_inherit_doc,
        doc,
        name,
        kind,
    })
}

/// The javadoc block immediately preceding a declaration, if any.
fn javadoc_for(parsed: &ParsedFile, node: Node) -> Option<String> {
    let prev = node.prev_named_sibling()?;
    if prev.kind() != "block_comment" {
        return None;
    }
    let text = parsed.node_text(prev);
    if !text.starts_with("/**") {
        return None;
    }
    Some(text.to_string())
}

fn visibility_of(parsed: &ParsedFile, node: Node) -> Visibility {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifiers" {
            let text = parsed.node_text(child);
            if text.contains("public") {
                return Visibility::Public;
            }
            if text.contains("protected") {
                return Visibility::Protected;
            }
            if text.contains("private") {
                return Visibility::Private;
            }
        }
    }
    Visibility::Package
}

fn declared_throws(parsed: &ParsedFile, node: Node) -> Vec<String> {
    let mut throws = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "throws" {
            let mut type_cursor = child.walk();
            for ty in child.named_children(&mut type_cursor) {
                throws.push(simple_name(parsed.node_text(ty)));
            }
        }
    }
    throws
}

fn observed_throws(parsed: &ParsedFile, node: Node) -> Vec<String> {
    let mut thrown = Vec::new();
    let body = match node.child_by_field_name("body") {
        Some(b) => b,
        None => return thrown,
    };
    collect_throw_sites(parsed, body, &mut thrown);
    thrown
}

fn collect_throw_sites(parsed: &ParsedFile, node: Node, thrown: &mut Vec<String>) {
    if node.kind() == "throw_statement" {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "object_creation_expression" {
                if let Some(ty) = child.child_by_field_name("type") {
                    let name = simple_name(parsed.node_text(ty));
                    if !thrown.contains(&name) {
                        thrown.push(name);
                    }
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        // Nested declarations get checked on their own.
        if child.kind() == "class_declaration" || child.kind() == "lambda_expression" {
            continue;
        }
        collect_throw_sites(parsed, child, thrown);
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

    fn check_java(source: &str) -> Vec<DocIssue> {
        let analyzer = get_analyzer("java").unwrap();
        let parsed = analyzer
            .parse(Path::new("Test.java"), source.as_bytes())
            .unwrap();
        JavaDocChecker::new().check(&parsed).unwrap()
    }

    #[test]
    fn test_declared_throws_without_tag() {
        let source = r#"
import java.io.IOException;

/** A sample class. */
public class Test {
    /**
     * Reads a file.
     */
    public void read() throws IOException {
    }
}
"#;
        let issues = check_java(source);
        let throws: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == DocIssueKind::MissingThrowsDoc)
            .collect();
        assert_eq!(throws.len(), 1);
        assert!(throws[0].message.contains("IOException"));
        assert_eq!(throws[0].line, 9);
    }

    #[test]
    fn test_documented_and_declared_is_consistent() {
        let source = r#"
/** A sample class. */
public class Test {
    /**
     * Reads a file.
     *
     * @throws IOException when the file is unreadable
     */
    public void read() throws IOException {
    }
}
"#;
        let issues = check_java(source);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_stale_throws_tag() {
        let source = r#"
/** A sample class. */
public class Test {
    /**
     * Does nothing risky.
     *
     * @throws IllegalStateException never
     */
    public void safe() {
    }
}
"#;
        let issues = check_java(source);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DocIssueKind::StaleThrowsDoc);
    }

    #[test]
    fn test_observed_throw_counts_as_actual() {
        let source = r#"
/** A sample class. */
public class Test {
    /**
     * Validates input.
     *
     * @throws IllegalArgumentException on bad input
     */
    public void validate(int x) {
        if (x < 0) {
            throw new IllegalArgumentException("negative");
        }
    }
}
"#;
        let issues = check_java(source);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_undocumented_public_member() {
        let source = r#"
public class Test {
    public void helper() {
    }

    private void internal() {
    }
}
"#;
        let issues = check_java(source);
        // Test (class) and helper() are public and undocumented;
        // internal() is private and exempt.
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.kind == DocIssueKind::UndocumentedClass));
        assert!(issues
            .iter()
            .any(|i| i.kind == DocIssueKind::UndocumentedFunction && i.message.contains("helper")));
    }

    #[test]
    fn test_inherit_doc_waives_checks() {
        let source = r#"
/** A sample class. */
public class Test {
    /** {@inheritDoc} */
    public void read() throws IOException {
    }
}
"#;
        let issues = check_java(source);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }
}
