//! Documentation checking: validates doc comments against observed code
//! behavior, with inline suppression.
//!
//! Each supported language implements [`DocChecker`]; a declaration moves
//! from undocumented to documented to consistent or inconsistent, and every
//! mismatch becomes a [`DocIssue`] with a stable short code.

mod java;
mod python;
mod suppress;
mod types;

pub use java::JavaDocChecker;
pub use python::PythonDocChecker;
pub use suppress::{
    filter_suppressed, matches_directive, parse_noqa_directives, NoqaDirective,
    SuppressedDocIssue,
};
pub use types::{DocIssue, DocIssueKind};

use once_cell::sync::OnceCell;

use crate::analysis::ParsedFile;

/// Language-specific documentation checker.
///
/// Implementations extract declarations, their documentation, and the
/// observed behavior (throw/raise/yield sites, attributes) from a parsed
/// file, then report every mismatch. Suppression is applied later, at
/// report time, so extraction always runs in full.
pub trait DocChecker: Send + Sync {
    /// Returns the language identifier this checker handles.
    fn language_id(&self) -> &'static str;

    /// Check all declarations in a parsed file.
    fn check(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<DocIssue>>;
}

/// Static storage for the Java checker.
static JAVA_DOC_CHECKER: OnceCell<JavaDocChecker> = OnceCell::new();

/// Static storage for the Python checker.
static PYTHON_DOC_CHECKER: OnceCell<PythonDocChecker> = OnceCell::new();

/// Get the documentation checker for a language, if one exists.
///
/// Adding a language means adding a checker variant here, not branching on
/// type tags inside shared logic.
pub fn checker_for_language(language_id: &str) -> Option<&'static dyn DocChecker> {
    match language_id {
        "java" => Some(JAVA_DOC_CHECKER.get_or_init(JavaDocChecker::new) as &dyn DocChecker),
        "python" => Some(PYTHON_DOC_CHECKER.get_or_init(PythonDocChecker::new) as &dyn DocChecker),
        _ => None,
    }
}
