//! AST-backed fact extraction.
//!
//! Each supported language implements [`LanguageAnalyzer`]; analyzers are
//! registered once in process-wide statics and looked up by file extension.

mod facts;
mod languages;
mod traits;

pub use facts::{Export, FileFacts, Import, Span};
pub use languages::{
    get_analyzer, language_for_extension, register_analyzers, JavaAnalyzer, JavaScriptAnalyzer,
    PythonAnalyzer, TypeScriptAnalyzer,
};
pub use traits::{LanguageAnalyzer, ParsedFile};
