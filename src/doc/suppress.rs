//! Inline suppression of documentation issues.
//!
//! A directive is a `noqa` comment on the declaration line or the line
//! immediately above it:
//!
//! - `# noqa` / `// noqa` — suppress every issue for that declaration
//! - `# noqa: SC201` — suppress exact-code matches
//! - `# noqa: SC2` — a shorter code suppresses all codes sharing the prefix
//!
//! Suppression is evaluated per-issue at report time; extraction always
//! runs in full.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::DocIssue;

/// A parsed `noqa` directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoqaDirective {
    /// Line the directive appears on (1-indexed).
    pub line: usize,
    /// Codes to suppress; empty means all.
    pub codes: Vec<String>,
}

/// An issue that a directive silenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDocIssue {
    pub issue: DocIssue,
    pub directive: NoqaDirective,
}

lazy_static! {
    /// Matches `# noqa` and `// noqa`, with an optional code list.
    static ref NOQA_PATTERN: Regex =
        Regex::new(r"(?:#|//)\s*noqa\b(?:\s*:\s*([A-Za-z0-9*]+(?:\s*,\s*[A-Za-z0-9*]+)*))?")
            .expect("noqa pattern is valid");
}

/// Scan file content for suppression directives.
pub fn parse_noqa_directives(content: &str) -> Vec<NoqaDirective> {
    let mut directives = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        if let Some(caps) = NOQA_PATTERN.captures(line) {
            let codes = caps
                .get(1)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(|c| c.trim().to_uppercase())
                        .filter(|c| !c.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            directives.push(NoqaDirective {
                line: line_idx + 1,
                codes,
            });
        }
    }

    directives
}

/// Whether a directive silences an issue.
///
/// The directive applies on the declaration's own line or the line
/// immediately above it. An empty code list (or `*`) suppresses all;
/// otherwise a listed code matches exactly or as a prefix.
pub fn matches_directive(issue: &DocIssue, directive: &NoqaDirective) -> bool {
    if directive.line != issue.line && directive.line + 1 != issue.line {
        return false;
    }

    if directive.codes.is_empty() {
        return true;
    }

    directive
        .codes
        .iter()
        .any(|code| code == "*" || issue.code == *code || issue.code.starts_with(code.as_str()))
}

/// Separate issues into active and suppressed.
pub fn filter_suppressed(
    issues: Vec<DocIssue>,
    directives: &[NoqaDirective],
) -> (Vec<DocIssue>, Vec<SuppressedDocIssue>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for issue in issues {
        match directives.iter().find(|d| matches_directive(&issue, d)) {
            Some(directive) => suppressed.push(SuppressedDocIssue {
                issue,
                directive: directive.clone(),
            }),
            None => active.push(issue),
        }
    }

    (active, suppressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::DocIssueKind;

    fn issue(kind: DocIssueKind, line: usize) -> DocIssue {
        DocIssue::new(kind, "msg", "f.py", line)
    }

    #[test]
    fn test_parse_directives() {
        let content = "def f():  # noqa\n    pass\n# noqa: SC201, SC3\ndef g():\n    pass\n";
        let directives = parse_noqa_directives(content);
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].line, 1);
        assert!(directives[0].codes.is_empty());
        assert_eq!(directives[1].line, 3);
        assert_eq!(directives[1].codes, vec!["SC201", "SC3"]);
    }

    #[test]
    fn test_bare_noqa_suppresses_everything() {
        let directive = NoqaDirective {
            line: 5,
            codes: vec![],
        };
        assert!(matches_directive(
            &issue(DocIssueKind::UndocumentedFunction, 5),
            &directive
        ));
        assert!(matches_directive(
            &issue(DocIssueKind::UndocumentedRaise, 6),
            &directive
        ));
        assert!(!matches_directive(
            &issue(DocIssueKind::UndocumentedRaise, 7),
            &directive
        ));
    }

    #[test]
    fn test_prefix_code_suppresses_family() {
        let directive = NoqaDirective {
            line: 10,
            codes: vec!["SC2".to_string()],
        };
        // SC2 covers SC201 and SC202
        assert!(matches_directive(
            &issue(DocIssueKind::MissingThrowsDoc, 10),
            &directive
        ));
        assert!(matches_directive(
            &issue(DocIssueKind::StaleThrowsDoc, 10),
            &directive
        ));
        // but not SC101
        assert!(!matches_directive(
            &issue(DocIssueKind::UndocumentedFunction, 10),
            &directive
        ));
    }

    #[test]
    fn test_filter_keeps_unmatched_active() {
        let directives = vec![NoqaDirective {
            line: 1,
            codes: vec!["SC101".to_string()],
        }];
        let issues = vec![
            issue(DocIssueKind::UndocumentedFunction, 2),
            issue(DocIssueKind::MissingThrowsDoc, 2),
        ];

        let (active, suppressed) = filter_suppressed(issues, &directives);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code, "SC201");
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].issue.code, "SC101");
    }
}
