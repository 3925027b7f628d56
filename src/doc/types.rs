//! Issue types for documentation checking.

use serde::{Deserialize, Serialize};

/// Kinds of documentation drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocIssueKind {
    /// A public function/method/constructor with no doc comment.
    #[serde(rename = "undocumented_function")]
    UndocumentedFunction,
    /// A public class/interface/enum with no doc comment.
    #[serde(rename = "undocumented_class")]
    UndocumentedClass,
    /// A declared or thrown exception type with no corresponding doc tag.
    #[serde(rename = "missing_throws_doc")]
    MissingThrowsDoc,
    /// A documented exception type that is neither declared nor thrown.
    #[serde(rename = "stale_throws_doc")]
    StaleThrowsDoc,
    /// A documented attribute that does not exist on the class.
    #[serde(rename = "stale_attribute_doc")]
    StaleAttributeDoc,
    /// A class attribute missing from a documented attribute list.
    #[serde(rename = "undocumented_attribute")]
    UndocumentedAttribute,
    /// A generator function whose documentation has no yields section.
    #[serde(rename = "undocumented_yield")]
    UndocumentedYield,
    /// A raised exception type missing from the raises section.
    #[serde(rename = "undocumented_raise")]
    UndocumentedRaise,
}

/// Issue-kind → stable short code. Process-wide immutable static data;
/// codes share a family prefix so suppression can match on prefixes
/// (`SC1` covers `SC101` and `SC102`).
static ISSUE_CODES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "undocumented_function" => "SC101",
    "undocumented_class" => "SC102",
    "missing_throws_doc" => "SC201",
    "stale_throws_doc" => "SC202",
    "stale_attribute_doc" => "SC301",
    "undocumented_attribute" => "SC302",
    "undocumented_yield" => "SC303",
    "undocumented_raise" => "SC304",
};

impl DocIssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocIssueKind::UndocumentedFunction => "undocumented_function",
            DocIssueKind::UndocumentedClass => "undocumented_class",
            DocIssueKind::MissingThrowsDoc => "missing_throws_doc",
            DocIssueKind::StaleThrowsDoc => "stale_throws_doc",
            DocIssueKind::StaleAttributeDoc => "stale_attribute_doc",
            DocIssueKind::UndocumentedAttribute => "undocumented_attribute",
            DocIssueKind::UndocumentedYield => "undocumented_yield",
            DocIssueKind::UndocumentedRaise => "undocumented_raise",
        }
    }

    /// The stable short code for this kind.
    pub fn code(&self) -> &'static str {
        ISSUE_CODES[self.as_str()]
    }
}

impl std::fmt::Display for DocIssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single documentation mismatch, located at the declaration it concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocIssue {
    pub kind: DocIssueKind,
    pub code: String,
    pub message: String,
    pub file: String,
    /// Line of the declaration (1-indexed).
    pub line: usize,
}

impl DocIssue {
    pub fn new(
        kind: DocIssueKind,
        message: impl Into<String>,
        file: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            kind,
            code: kind.code().to_string(),
            message: message.into(),
            file: file.into(),
            line,
        }
    }
}
